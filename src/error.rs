use thiserror::Error;

/// Which of the three handle spaces a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Atom,
    Bond,
    Stereo,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleKind::Atom => write!(f, "Atom"),
            HandleKind::Bond => write!(f, "Bond"),
            HandleKind::Stereo => write!(f, "Stereo"),
        }
    }
}

/// The broad classes of failure a construction call can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidHandle,
    ResourceExhausted,
    Validation,
    MalformedInput,
    Extension,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MolError {
    #[error("{0} ID is invalid")]
    InvalidHandle(HandleKind),
    #[error("Bond index {0} is out of range")]
    BondIndexOutOfRange(usize),
    #[error("Vertex index {0} is out of range")]
    VertexIndexOutOfRange(usize),

    #[error("Out of memory while {0}")]
    OutOfMemory(&'static str),

    #[error("Element name {0} is not recognised")]
    UnknownElement(String),
    #[error("Atomic number {0} is out of range")]
    AtomicNumberOutOfRange(i64),
    #[error("Hydrogen isotope {0} is not recognised")]
    UnknownHydrogenIsotope(i32),
    #[error("Implicit hydrogen count may not be negative unless it is -1, meaning deduce from valency")]
    NegativeImplicitHydrogens(i32),
    #[error("Implicit protium, deuterium and tritium counts may not be negative")]
    NegativeIsotopicHydrogens(i32),
    #[error("Atom mass may not be negative")]
    NegativeMass(i32),
    #[error("Atom charge {0} is out of range")]
    ChargeOutOfRange(i32),
    #[error("Radical type {0} is not recognised")]
    UnknownRadical(i32),
    #[error("Atom has too many bonds")]
    TooManyBonds,
    #[error("A bond cannot join an atom to itself")]
    SelfBond,
    #[error("A bond already exists between the atoms")]
    DuplicateBond,
    #[error("Reference atom is illegal")]
    IllegalReferenceAtom,
    #[error("Unexpected stereo topology {0}")]
    UnexpectedTopology(i32),
    #[error("Stereo centre does not have a central atom")]
    NoCentralAtom,
    #[error("Stereo centre does not have a central bond")]
    NoCentralBond,

    #[error("Bond type {0} is not recognised")]
    UnknownBondType(i32),
    #[error("Stereo type {0} is not recognised")]
    UnknownBondStereo(i32),
    #[error("Atom cannot have {0} aromatic bonds")]
    AromaticBondCount(usize),
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Polymer unit refers to invalid bond {0}")]
    PolymerInvalidBond(i32),
    #[error("Hydrogen as polymer end group is not supported")]
    PolymerHydrogenEndGroup,
    #[error("V3000 data error, {0}")]
    MalformedMetadata(String),
}

impl MolError {
    pub fn kind(&self) -> ErrorKind {
        use MolError::*;
        match self {
            InvalidHandle(_) | BondIndexOutOfRange(_) | VertexIndexOutOfRange(_) => {
                ErrorKind::InvalidHandle
            }
            OutOfMemory(_) => ErrorKind::ResourceExhausted,
            UnknownBondType(_) | UnknownBondStereo(_) | AromaticBondCount(_) | MalformedInput(_) => {
                ErrorKind::MalformedInput
            }
            PolymerInvalidBond(_) | PolymerHydrogenEndGroup | MalformedMetadata(_) => {
                ErrorKind::Extension
            }
            _ => ErrorKind::Validation,
        }
    }
}

pub type Result<T, E = MolError> = std::result::Result<T, E>;
