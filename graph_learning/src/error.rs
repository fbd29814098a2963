use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire graph learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The graph learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    NodeOutOfBounds {
        node: usize,
        num_nodes: usize,
    },
    SelfLoopsAlreadyAdded,
    LabelOutOfRange {
        node: usize,
        label: usize,
        num_classes: usize,
    },
    MasksOverlap {
        node: usize,
    },
    MasksIncomplete {
        node: usize,
    },
    EmptyMask,
    NoForwardPass,
    InvalidInit(String),
    Parse {
        line: usize,
        msg: String,
    },
    Io(io::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "size mismatch for {what}: got {got}, expected {expected}"
            ),
            MlErr::NodeOutOfBounds { node, num_nodes } => write!(
                f,
                "node {node} is out of bounds for a graph of {num_nodes} nodes"
            ),
            MlErr::SelfLoopsAlreadyAdded => {
                write!(f, "self loops were already added to this graph")
            }
            MlErr::LabelOutOfRange {
                node,
                label,
                num_classes,
            } => write!(
                f,
                "node {node} has label {label} but there are only {num_classes} classes"
            ),
            MlErr::MasksOverlap { node } => {
                write!(f, "node {node} belongs to more than one mask")
            }
            MlErr::MasksIncomplete { node } => {
                write!(f, "node {node} does not belong to any mask")
            }
            MlErr::EmptyMask => write!(f, "the mask does not select any node"),
            MlErr::NoForwardPass => {
                write!(f, "backward called without a training forward pass")
            }
            MlErr::InvalidInit(msg) => write!(f, "invalid initialization: {msg}"),
            MlErr::Parse { line, msg } => write!(f, "parse error at line {line}: {msg}"),
            MlErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
