use petgraph::graph::UnGraph;

mod element;
pub use element::*;

mod error;
pub use error::{ErrorKind, HandleKind, MolError};

mod status;
pub use status::*;

mod handle;
pub use handle::*;

mod mol;
pub use mol::*;

mod stereo;
pub use stereo::*;

pub mod ctab;

mod extension;
pub use extension::*;

mod parse;
pub use parse::*;

mod import;
pub use import::*;

/// Connectivity of a molecule: one node per atom, one edge per bond.
pub type MoleculeGraph = UnGraph<Atom, Bond>;

/// Installs a formatting subscriber at the given level, falling back to
/// `info` for anything that doesn't parse. Later calls are no-ops.
pub fn init_logging(level: &str) {
    let level = level.parse().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init();
}
