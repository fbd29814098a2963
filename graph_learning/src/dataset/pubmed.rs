//! Loader for the Pubmed-Diabetes citation dataset in its tab separated
//! distribution: one file describing the papers (label and TF-IDF word
//! features) and one listing the citations between them.

use std::{
    collections::{BTreeSet, HashMap},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{info, warn};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use super::{GraphDataset, SplitSpec};
use crate::{MlErr, Result, graph::Graph};

/// The name of the dataset.
pub const NAME: &str = "pubmed";

/// The file holding the papers.
pub const NODE_FILE: &str = "Pubmed-Diabetes.NODE.paper.tab";

/// The file holding the citations.
pub const CITES_FILE: &str = "Pubmed-Diabetes.DIRECTED.cites.tab";

const PAPER_PREFIX: &str = "paper:";

/// The papers of the dataset, indexed in file order.
#[derive(Debug, Clone)]
pub struct Papers {
    pub ids: HashMap<String, usize>,
    pub features: Array2<f32>,
    pub labels: Vec<usize>,
    pub num_classes: usize,
}

/// Loads the dataset stored in `dir`.
///
/// # Arguments
/// * `dir` - The directory containing `NODE_FILE` and `CITES_FILE`.
/// * `spec` - How to split the nodes into train, validation and test.
/// * `rng` - The random number generator used for the split.
///
/// # Returns
/// The dataset or an error if a file is missing or malformed.
pub fn load<P, R>(dir: P, spec: SplitSpec, rng: &mut R) -> Result<GraphDataset>
where
    P: AsRef<Path>,
    R: Rng,
{
    let dir = dir.as_ref();
    info!("loading {NAME} from {}", dir.display());

    let nodes = BufReader::new(File::open(dir.join(NODE_FILE))?);
    let cites = BufReader::new(File::open(dir.join(CITES_FILE))?);
    from_readers(nodes, cites, spec, rng)
}

/// Builds the dataset from the contents of both files.
///
/// Every citation becomes an edge in each direction, features are normalized
/// so each row sums up to one.
pub fn from_readers<N, C, R>(nodes: N, cites: C, spec: SplitSpec, rng: &mut R) -> Result<GraphDataset>
where
    N: BufRead,
    C: BufRead,
    R: Rng,
{
    let Papers {
        ids,
        mut features,
        labels,
        num_classes,
    } = read_papers(nodes)?;

    let citations = read_citations(cites, &ids)?;
    let edges = citations.iter().flat_map(|&(u, v)| [(u, v), (v, u)]);
    let edges: BTreeSet<(usize, usize)> = edges.collect();
    let graph = Graph::new(labels.len(), edges)?;

    normalize_rows(&mut features);
    let split = spec.split(&labels, num_classes, rng);

    GraphDataset::new(
        graph,
        features,
        Array1::from_vec(labels),
        num_classes,
        split,
    )
}

/// Parses the papers file.
pub fn read_papers<B: BufRead>(reader: B) -> Result<Papers> {
    let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, kind) = next_line(&mut lines, 1)?;
    if kind.trim() != "NODE\tpaper" {
        return Err(parse_err(1, format!("expected a NODE header, got {kind:?}")));
    }

    let (_, schema) = next_line(&mut lines, 2)?;
    let (categories, columns) = parse_schema(&schema)?;

    let mut ids = HashMap::new();
    let mut rows: Vec<Vec<(usize, f32)>> = Vec::new();
    let mut labels = Vec::new();

    for (line, content) in lines {
        let content = content?;
        if content.trim().is_empty() {
            continue;
        }

        let mut fields = content.split('\t');
        let id = fields.next().unwrap_or_default().trim().to_string();
        let mut label = None;
        let mut row = Vec::new();

        for field in fields {
            let Some((key, value)) = field.split_once('=') else {
                return Err(parse_err(line, format!("expected key=value, got {field:?}")));
            };

            match key {
                "label" => {
                    let class = categories.iter().position(|c| c == value);
                    label = Some(class.ok_or_else(|| {
                        parse_err(line, format!("unknown label {value:?}"))
                    })?);
                }
                "summary" => {}
                _ => {
                    let &col = columns
                        .get(key)
                        .ok_or_else(|| parse_err(line, format!("unknown feature {key:?}")))?;
                    let value = value
                        .parse()
                        .map_err(|e| parse_err(line, format!("bad value for {key}: {e}")))?;
                    row.push((col, value));
                }
            }
        }

        let label = label.ok_or_else(|| parse_err(line, format!("paper {id} has no label")))?;

        if ids.insert(id.clone(), labels.len()).is_some() {
            return Err(parse_err(line, format!("duplicated paper {id}")));
        }

        labels.push(label);
        rows.push(row);
    }

    let mut features = Array2::zeros((rows.len(), columns.len()));
    for (i, row) in rows.into_iter().enumerate() {
        for (col, value) in row {
            features[[i, col]] = value;
        }
    }

    Ok(Papers {
        ids,
        features,
        labels,
        num_classes: categories.len(),
    })
}

/// Parses the citations file, keeping every citation between two distinct
/// known papers.
///
/// # Returns
/// The `(citing, cited)` node pairs in file order.
pub fn read_citations<B: BufRead>(
    reader: B,
    ids: &HashMap<String, usize>,
) -> Result<Vec<(usize, usize)>> {
    let mut citations = Vec::new();
    let mut skipped = 0;

    // `DIRECTED\tcites` and `NO_FEATURES`
    for (i, content) in reader.lines().enumerate().skip(2) {
        let line = i + 1;
        let content = content?;
        if content.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split('\t').map(str::trim).collect();
        let [_, from, "|", to] = fields[..] else {
            return Err(parse_err(line, format!("malformed citation {content:?}")));
        };

        let node = |field: &str| {
            field
                .strip_prefix(PAPER_PREFIX)
                .ok_or_else(|| parse_err(line, format!("expected {PAPER_PREFIX}<id>, got {field:?}")))
                .map(|id| ids.get(id).copied())
        };

        match (node(from)?, node(to)?) {
            (Some(u), Some(v)) if u != v => citations.push((u, v)),
            (Some(_), Some(_)) => {}
            _ => {
                warn!(line = line; "citation references an unknown paper");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("skipped {skipped} citations to unknown papers");
    }

    Ok(citations)
}

fn parse_schema(schema: &str) -> Result<(Vec<String>, HashMap<String, usize>)> {
    let mut fields = schema.split('\t');

    let label = fields.next().unwrap_or_default();
    let categories = label
        .strip_prefix("cat=")
        .and_then(|rest| rest.strip_suffix(":label"))
        .ok_or_else(|| parse_err(2, format!("expected cat=...:label, got {label:?}")))?;
    let categories: Vec<String> = categories.split(',').map(str::to_string).collect();

    let mut columns = HashMap::new();

    for field in fields {
        let field = field.trim();
        if field.is_empty() || field.starts_with("string:") {
            continue;
        }

        let Some(name) = field.strip_prefix("numeric:").and_then(|f| f.split(':').next()) else {
            return Err(parse_err(2, format!("unsupported column {field:?}")));
        };

        let next = columns.len();
        columns.entry(name.to_string()).or_insert(next);
    }

    Ok((categories, columns))
}

fn normalize_rows(features: &mut Array2<f32>) {
    for mut row in features.axis_iter_mut(Axis(0)) {
        let sum = row.sum();

        if sum != 0.0 {
            row /= sum;
        }
    }
}

fn next_line<I>(lines: &mut I, expected: usize) -> Result<(usize, String)>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let (line, content) = lines
        .next()
        .ok_or_else(|| parse_err(expected, "unexpected end of file".to_string()))?;
    Ok((line, content?))
}

fn parse_err(line: usize, msg: String) -> MlErr {
    MlErr::Parse { line, msg }
}
