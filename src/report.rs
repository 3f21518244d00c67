//! CSV export of the paths chosen by a master solution.
use crate::error::PricingError;
use crate::graph::{Node, Path};
use crate::store::Registry;
use std::io::Write;

const NODE_COLUMNS: [&str; 7] = ["career_group", "career", "rank", "time_slice", "status", "in_training", "network"];

fn write_header(writer: &mut impl Write) -> std::io::Result<()> {
    let mut columns: Vec<String> = Vec::with_capacity(2 * NODE_COLUMNS.len() + 2);
    for side in ["from", "to"] {
        columns.extend(NODE_COLUMNS.iter().map(|c| format!("{}.{}", c, side)));
    }
    columns.push("group".into());
    columns.push("value".into());
    writeln!(writer, "{}", columns.join(","))
}

/// Flags are written as `0`/`1`.
fn write_node(writer: &mut impl Write, node: &Node) -> std::io::Result<()> {
    write!(
        writer,
        "{},{},{},{},{},{},{}",
        node.career_group,
        node.career,
        node.rank,
        node.time_slice,
        node.status,
        u8::from(node.in_training),
        node.network
    )
}

fn write_path(writer: &mut impl Write, path: &Path, value: f64) -> std::io::Result<usize> {
    for arc in &path.arcs {
        write_node(writer, &arc.source)?;
        write!(writer, ",")?;
        write_node(writer, &arc.target)?;
        writeln!(writer, ",{},{}", path.network_group, value)?;
    }
    Ok(path.arcs.len())
}

/// Writes one row per arc of every generated column with a positive value.
///
/// `solution` pairs master variable names with their values; names that are
/// not generated columns are skipped, and so are values that are zero,
/// negative or NaN. Returns the number of data rows.
pub fn write_paths_csv<W, I, S>(registry: &Registry, solution: I, mut writer: W) -> Result<usize, PricingError>
where
    W: Write,
    I: IntoIterator<Item = (S, f64)>,
    S: AsRef<str>,
{
    write_header(&mut writer)?;
    let mut rows = 0;
    for (name, value) in solution {
        if !(value > 0.0) {
            continue;
        }
        let Some(path) = registry.get_path(name.as_ref()) else {
            continue;
        };
        rows += write_path(&mut writer, &path, value)?;
    }
    writer.flush()?;
    log::info!("Wrote {} path rows", rows);
    Ok(rows)
}
