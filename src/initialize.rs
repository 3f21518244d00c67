//! Populates a `Registry` before the first pricing round: builds the networks
//! and indexes the master constraints that mention pricing variables.

use crate::codec::parse_variable_name;
use crate::error::PricingError;
use crate::graph::{Arc, Network, NetworkDescription};
use crate::pricing::MasterModel;
use crate::store::{Constraint, Registry};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

const DESCRIPTION_EXTENSION: &str = "json";

/// Reads every `*.json` network description in `dir`, in file-name order.
///
/// A description without an `identifier` is named after its file, so that the
/// group id can be taken from names like `graph_26.json`.
pub fn read_descriptions(dir: impl AsRef<Path>) -> Result<Vec<NetworkDescription>, PricingError> {
    let dir = dir.as_ref();
    let input_error = |path: &Path, source| PricingError::Input { path: path.display().to_string(), source };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| input_error(dir, e))? {
        let path = entry.map_err(|e| input_error(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DESCRIPTION_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    let mut descriptions = Vec::with_capacity(files.len());
    for path in files {
        let file = File::open(&path).map_err(|e| input_error(path.as_path(), e))?;
        let mut description = NetworkDescription::from_reader(BufReader::new(file)).map_err(|source| PricingError::Description {
            path: path.display().to_string(),
            source,
        })?;
        if description.identifier.is_empty() {
            if let Some(name) = path.file_name() {
                description.identifier = name.to_string_lossy().into_owned();
            }
        }
        log::debug!("Read network description '{}'", path.display());
        descriptions.push(description);
    }
    Ok(descriptions)
}

/// Builds one network per description in parallel and registers it together
/// with its arc -> network index. Returns the number of networks.
pub fn build_networks(
    descriptions: &[NetworkDescription],
    registry: &Registry,
    pool: &ThreadPool,
) -> Result<usize, PricingError> {
    if descriptions.is_empty() {
        return Err(PricingError::NoNetworks);
    }

    pool.install(|| {
        descriptions.par_iter().try_for_each(|description| {
            let network = Network::from_description(description)?;
            let group = network.group();
            let arcs: Vec<Arc> = network.arcs().collect();
            log::debug!(
                "Built network {} from '{}': {} vertices, {} arcs",
                group,
                description.identifier,
                network.vertex_count(),
                arcs.len()
            );
            registry.add_network(network)?;
            registry.add_arcs_of_network(group, arcs)?;
            Ok::<_, PricingError>(())
        })
    })?;

    let count = registry.network_count();
    log::info!("Built {} networks", count);
    Ok(count)
}

/// Walks every master constraint once.
///
/// Constraints whose name contains one of `unneeded_substrings` are deleted.
/// In every other constraint, each pricing variable is recorded against its
/// arc and then removed from the constraint; constraints that held at least one
/// such variable are opened to new columns and registered. Returns the number
/// of registered constraints.
pub fn build_constraint_index<M: MasterModel>(
    master: &mut M,
    registry: &Registry,
    unneeded_substrings: &[String],
) -> Result<usize, PricingError> {
    let mut registered = 0;
    let mut deleted = 0;

    for handle in master.constraints() {
        let name = master.constraint_name(handle)?;
        if unneeded_substrings.iter().any(|s| name.contains(s.as_str())) {
            log::trace!("Deleting constraint {}", name);
            master.delete_constraint(handle)?;
            deleted += 1;
            continue;
        }

        let mut arcs = Vec::new();
        for (variable, coefficient) in master.constraint_terms(handle)? {
            let variable_name = master.variable_name(variable)?;
            let Some(arc) = parse_variable_name(&variable_name)? else {
                continue;
            };
            registry.add_constraint_to_arc(arc, handle, coefficient);
            log::trace!("Removing {} from constraint {}", variable_name, name);
            master.remove_coefficient(handle, variable)?;
            arcs.push((arc, coefficient));
        }

        if !arcs.is_empty() {
            log::trace!("Constraint {} holds {} pricing variables", name, arcs.len());
            master.set_modifiable(handle)?;
            registry.add_constraint(Constraint { handle, arcs });
            registered += 1;
        }
    }

    log::info!("Indexed {} pricing constraints, deleted {}", registered, deleted);
    Ok(registered)
}
