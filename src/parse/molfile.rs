use std::str::FromStr;

use anyhow::{Context, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_while1},
    character::complete::{i32 as int, space0, space1, u32 as uint},
    combinator::{all_consuming, cut, eof, map, rest},
    error::{convert_error, VerboseError},
    multi::count,
    number::complete::double,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use thiserror::Error;
use tracing::*;

use crate::ctab::{
    SGroupConnection, SGroupKind, SGroupSubtype, TableAtom, TableBond, TableRecord, TableSGroup,
};
use crate::{atomic_number, rounded_mass, ZERO_ATW_DIFF};

pub type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[derive(Error, Debug)]
pub enum MolfileError {
    #[error("File ends before the {0}")]
    UnexpectedEnd(&'static str),
    #[error("Line {line}: cannot read {field} from {text:?}")]
    BadField {
        line: usize,
        field: &'static str,
        text: String,
    },
    #[error("Line {0}: charge code {1} is not recognised")]
    BadChargeCode(usize, i32),
    #[error("V3000 connection tables are not supported")]
    V3000,
    #[error("Line {0}: malformed property line\n{1}")]
    BadProperty(usize, String),
}

/// A connection table read from text, together with everything the reader
/// skipped or could not interpret.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedMolfile {
    pub name: String,
    pub record: TableRecord,
    pub warnings: Vec<String>,
}

/// Parses one MDL V2000 molfile.
pub fn parse_molfile(text: &str) -> Result<ParsedMolfile> {
    parse_molfile_helper(text).context("Failed to parse molfile")
}

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
        }
    }

    fn next_line(&mut self, what: &'static str) -> Result<(usize, &'a str), MolfileError> {
        self.inner
            .next()
            .map(|(i, line)| (i + 1, line))
            .ok_or(MolfileError::UnexpectedEnd(what))
    }
}

/// The trimmed contents of a fixed-width column, empty when the line is
/// too short.
fn column(line: &str, start: usize, width: usize) -> &str {
    let end = (start + width).min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn required<T: FromStr>(
    line: &str,
    number: usize,
    start: usize,
    width: usize,
    field: &'static str,
) -> Result<T, MolfileError> {
    let text = column(line, start, width);
    text.parse().map_err(|_| MolfileError::BadField {
        line: number,
        field,
        text: text.to_string(),
    })
}

fn optional<T: FromStr + Default>(
    line: &str,
    number: usize,
    start: usize,
    width: usize,
    field: &'static str,
) -> Result<T, MolfileError> {
    if column(line, start, width).is_empty() {
        Ok(T::default())
    } else {
        required(line, number, start, width, field)
    }
}

fn parse_molfile_helper(text: &str) -> Result<ParsedMolfile, MolfileError> {
    let mut lines = Lines::new(text);
    let mut parsed = ParsedMolfile::default();

    let (_, name) = lines.next_line("header")?;
    parsed.name = name.trim().to_string();
    lines.next_line("header")?;
    lines.next_line("header")?;

    let (number, counts) = lines.next_line("counts line")?;
    if counts.contains("V3000") {
        return Err(MolfileError::V3000);
    }
    let n_atoms: usize = required(counts, number, 0, 3, "atom count")?;
    let n_bonds: usize = required(counts, number, 3, 3, "bond count")?;
    let chiral: i32 = optional(counts, number, 12, 3, "chiral flag")?;
    parsed.record.chiral = chiral == 1;
    debug!("reading molfile {:?}: {} atoms, {} bonds", parsed.name, n_atoms, n_bonds);

    parsed.record.atoms.reserve(n_atoms);
    for _ in 0..n_atoms {
        let (number, line) = lines.next_line("atom block")?;
        parsed.record.atoms.push(atom_line(line, number)?);
    }

    parsed.record.bonds.reserve(n_bonds);
    for _ in 0..n_bonds {
        let (number, line) = lines.next_line("bond block")?;
        parsed.record.bonds.push(TableBond {
            atom1: required(line, number, 0, 3, "first atom")?,
            atom2: required(line, number, 3, 3, "second atom")?,
            bond_type: required(line, number, 6, 3, "bond type")?,
            stereo: optional(line, number, 9, 3, "bond stereo")?,
        });
    }

    properties(&mut lines, &mut parsed)?;
    Ok(parsed)
}

fn atom_line(line: &str, number: usize) -> Result<TableAtom, MolfileError> {
    let symbol = match column(line, 31, 3) {
        "*" => "Zz",
        symbol => symbol,
    };
    let mut atom = TableAtom::new(symbol);
    if atom.symbol.is_empty() {
        return Err(MolfileError::BadField {
            line: number,
            field: "atom symbol",
            text: String::new(),
        });
    }
    atom.x = required(line, number, 0, 10, "x coordinate")?;
    atom.y = required(line, number, 10, 10, "y coordinate")?;
    atom.z = required(line, number, 20, 10, "z coordinate")?;
    atom.mass_difference = optional(line, number, 34, 2, "mass difference")?;

    let charge_code: i32 = optional(line, number, 36, 3, "charge")?;
    (atom.charge, atom.radical) = match charge_code {
        0 => (0, 0),
        1..=3 | 5..=7 => (4 - charge_code, 0),
        4 => (0, 2),
        _ => return Err(MolfileError::BadChargeCode(number, charge_code)),
    };
    atom.valence = optional(line, number, 48, 3, "valence")?;
    Ok(atom)
}

#[derive(Debug, Clone, PartialEq)]
enum Property<'a> {
    Charge(Vec<(u32, i32)>),
    Radical(Vec<(u32, i32)>),
    Isotope(Vec<(u32, i32)>),
    SGroupKind(Vec<(u32, &'a str)>),
    SGroupSubtype(Vec<(u32, &'a str)>),
    SGroupConnection(Vec<(u32, &'a str)>),
    SGroupLabel(Vec<(u32, i32)>),
    SGroupAtoms(u32, Vec<i32>),
    SGroupBonds(u32, Vec<i32>),
    SGroupText(u32, &'a str),
    SGroupBracket(u32, [f64; 4]),
    End,
    Other(&'a str),
}

fn field_int(input: &str) -> Res<i32> {
    preceded(space1, int)(input)
}

fn field_uint(input: &str) -> Res<u32> {
    preceded(space1, uint)(input)
}

fn mnemonic(input: &str) -> Res<&str> {
    preceded(space1, take_while1(|c: char| c.is_ascii_alphanumeric()))(input)
}

/// `nn8 aaa vvv ...`: a count followed by that many pairs.
fn pairs<'a, O>(
    value: impl FnMut(&'a str) -> Res<'a, O>,
) -> impl FnMut(&'a str) -> Res<'a, Vec<(u32, O)>> {
    let mut entries_value = value;
    move |input| {
        let (input, n) = field_uint(input)?;
        count(pair(field_uint, &mut entries_value), n as usize)(input)
    }
}

/// `sssn15 iii ...`: an S-group number, a count and that many numbers.
fn member_list(input: &str) -> Res<(u32, Vec<i32>)> {
    let (input, group) = field_uint(input)?;
    let (input, n) = field_uint(input)?;
    let (input, members) = count(field_int, n as usize)(input)?;
    Ok((input, (group, members)))
}

fn bracket(input: &str) -> Res<(u32, [f64; 4])> {
    let (input, (group, _, x1, y1, x2, y2)) = tuple((
        field_uint,
        field_uint,
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, double),
    ))(input)?;
    Ok((input, (group, [x1, y1, x2, y2])))
}

fn property(input: &str) -> Res<Property> {
    all_consuming(terminated(
        preceded(
            tag("M  "),
            alt((
                map(terminated(tag("END"), pair(space0, eof)), |_| Property::End),
                preceded(tag("CHG"), cut(map(pairs(field_int), Property::Charge))),
                preceded(tag("RAD"), cut(map(pairs(field_int), Property::Radical))),
                preceded(tag("ISO"), cut(map(pairs(field_int), Property::Isotope))),
                preceded(tag("STY"), cut(map(pairs(mnemonic), Property::SGroupKind))),
                preceded(tag("SST"), cut(map(pairs(mnemonic), Property::SGroupSubtype))),
                preceded(tag("SCN"), cut(map(pairs(mnemonic), Property::SGroupConnection))),
                preceded(tag("SLB"), cut(map(pairs(field_int), Property::SGroupLabel))),
                preceded(
                    tag("SAL"),
                    cut(map(member_list, |(g, m)| Property::SGroupAtoms(g, m))),
                ),
                preceded(
                    tag("SBL"),
                    cut(map(member_list, |(g, m)| Property::SGroupBonds(g, m))),
                ),
                preceded(
                    tag("SMT"),
                    cut(map(
                        pair(field_uint, preceded(space1, rest)),
                        |(g, text): (u32, &str)| Property::SGroupText(g, text.trim()),
                    )),
                ),
                preceded(
                    tag("SDI"),
                    cut(map(bracket, |(g, b)| Property::SGroupBracket(g, b))),
                ),
                map(terminated(take(3usize), rest), Property::Other),
            )),
        ),
        space0,
    ))(input)
}

fn parse_property(line: &str, number: usize) -> Result<Property, MolfileError> {
    match property(line) {
        Ok((_, property)) => Ok(property),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(MolfileError::BadProperty(number, convert_error(line, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(MolfileError::BadProperty(
            number,
            "incomplete input".to_string(),
        )),
    }
}

fn table_atom<'a>(
    atoms: &'a mut [TableAtom],
    number: u32,
    warnings: &mut Vec<String>,
    line: usize,
) -> Option<&'a mut TableAtom> {
    let found = (number as usize).checked_sub(1).and_then(|i| atoms.get_mut(i));
    if found.is_none() {
        warnings.push(format!("Line {}: atom {} does not exist", line, number));
    }
    found
}

/// Mass difference from the rounded average mass, with `ZERO_ATW_DIFF`
/// standing in for an isotope that matches it exactly.
fn isotope_difference(symbol: &str, mass: i32) -> Option<i32> {
    let average = atomic_number(symbol).and_then(rounded_mass)?;
    match mass - average {
        0 => Some(ZERO_ATW_DIFF),
        difference => Some(difference),
    }
}

fn sgroup<'a>(
    groups: &'a mut [TableSGroup],
    id: u32,
    warnings: &mut Vec<String>,
    number: usize,
) -> Option<&'a mut TableSGroup> {
    let found = groups.iter_mut().find(|g| g.id == id as i32);
    if found.is_none() {
        warnings.push(format!("Line {}: S-group {} is not defined", number, id));
    }
    found
}

fn properties(lines: &mut Lines, parsed: &mut ParsedMolfile) -> Result<(), MolfileError> {
    let record = &mut parsed.record;
    let warnings = &mut parsed.warnings;
    let mut atom_block_reset = false;
    let mut isotopes_reset = false;
    let mut sdi_seen: Vec<u32> = Vec::new();

    while let Ok((number, line)) = lines.next_line("property block") {
        if line.starts_with("A  ") {
            // The alias text follows on its own line.
            let atom: usize = required(line, number, 3, 3, "alias atom")?;
            match atom.checked_sub(1).and_then(|i| record.atoms.get_mut(i)) {
                Some(target) => target.aliased = true,
                None => warnings.push(format!("Line {}: alias for missing atom {}", number, atom)),
            }
            lines.next_line("alias text")?;
            continue;
        }
        if !line.starts_with("M  ") {
            warnings.push(format!("Line {}: ignoring {:?}", number, line.trim_end()));
            continue;
        }

        let property = parse_property(line, number)?;
        if matches!(property, Property::Charge(_) | Property::Radical(_)) && !atom_block_reset {
            // CHG and RAD lines replace every charge and radical of the atom block.
            for atom in record.atoms.iter_mut() {
                atom.charge = 0;
                atom.radical = 0;
            }
            atom_block_reset = true;
        }
        if matches!(property, Property::Isotope(_)) && !isotopes_reset {
            for atom in record.atoms.iter_mut() {
                atom.mass_difference = 0;
            }
            isotopes_reset = true;
        }

        match property {
            Property::End => return Ok(()),
            Property::Charge(entries) => {
                for (atom, value) in entries {
                    if let Some(target) = table_atom(&mut record.atoms, atom, warnings, number) {
                        target.charge = value;
                    }
                }
            }
            Property::Radical(entries) => {
                for (atom, value) in entries {
                    if let Some(target) = table_atom(&mut record.atoms, atom, warnings, number) {
                        target.radical = value;
                    }
                }
            }
            Property::Isotope(entries) => {
                for (atom, mass) in entries {
                    if let Some(target) = table_atom(&mut record.atoms, atom, warnings, number) {
                        match isotope_difference(&target.symbol, mass) {
                            Some(difference) => target.mass_difference = difference,
                            None => warnings.push(format!(
                                "Line {}: no average mass for {} isotope {}",
                                number, target.symbol, mass
                            )),
                        }
                    }
                }
            }
            Property::SGroupKind(entries) => {
                for (id, text) in entries {
                    let kind = SGroupKind::from_mdl(text).unwrap_or_else(|| {
                        warnings.push(format!("Line {}: unknown S-group type {}", number, text));
                        SGroupKind::None
                    });
                    record.sgroups.push(TableSGroup::new(id as i32, kind));
                }
            }
            Property::SGroupSubtype(entries) => {
                for (id, text) in entries {
                    if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                        group.subtype = SGroupSubtype::from_mdl(text).unwrap_or_default();
                    }
                }
            }
            Property::SGroupConnection(entries) => {
                for (id, text) in entries {
                    if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                        group.conn = SGroupConnection::from_mdl(text).unwrap_or_default();
                    }
                }
            }
            Property::SGroupLabel(entries) => {
                for (id, label) in entries {
                    if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                        group.label = label;
                    }
                }
            }
            Property::SGroupAtoms(id, members) => {
                if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                    group.atoms.extend(members);
                }
            }
            Property::SGroupBonds(id, members) => {
                if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                    group.bonds.extend(members);
                }
            }
            Property::SGroupText(id, text) => {
                if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                    group.smt = text.to_string();
                }
            }
            Property::SGroupBracket(id, coordinates) => {
                if let Some(group) = sgroup(&mut record.sgroups, id, warnings, number) {
                    if sdi_seen.contains(&id) {
                        group.bracket2 = coordinates;
                    } else {
                        group.bracket1 = coordinates;
                        sdi_seen.push(id);
                    }
                }
            }
            Property::Other(name) => {
                warnings.push(format!("Line {}: unsupported property {}", number, name));
            }
        }
    }

    warnings.push("Missing M  END line".to_string());
    Ok(())
}
