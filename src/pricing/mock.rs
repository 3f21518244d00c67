//! An in-memory master problem for tests.
use super::master::{MasterModel, MasterProblem};
use crate::error::MasterError;
use crate::store::{ConsId, VarId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct MockConstraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub modifiable: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockVariable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
    pub committed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockMaster {
    pub constraints: Vec<MockConstraint>,
    pub variables: Vec<MockVariable>,
    pub duals: HashMap<ConsId, f64>,
    pub farkas: HashMap<ConsId, f64>,
    pub transformed: HashMap<ConsId, ConsId>,
    /// Name of a trait operation that should fail when called.
    pub fail_on: Option<&'static str>,
}

impl MockMaster {
    pub fn new() -> Self { Self::default() }

    pub fn add_constraint(&mut self, name: &str) -> ConsId {
        self.constraints.push(MockConstraint { name: name.to_string(), ..Default::default() });
        ConsId::new(self.constraints.len() - 1)
    }

    pub fn add_variable(&mut self, name: &str) -> VarId {
        self.variables.push(MockVariable {
            name: name.to_string(),
            upper: f64::INFINITY,
            committed: true,
            ..Default::default()
        });
        VarId::new(self.variables.len() - 1)
    }

    pub fn add_term(&mut self, constraint: ConsId, variable: VarId, coefficient: f64) {
        self.constraints[constraint.index()].terms.push((variable, coefficient));
    }

    pub fn set_dual(&mut self, constraint: ConsId, value: f64) {
        self.duals.insert(constraint, value);
    }

    pub fn set_farkas(&mut self, constraint: ConsId, value: f64) {
        self.farkas.insert(constraint, value);
    }

    /// Mimics presolve: every live constraint gets a transformed copy under a new handle.
    pub fn transform(&mut self) {
        let originals = self.constraints.len();
        for index in 0..originals {
            if self.constraints[index].deleted {
                continue;
            }
            let copy = self.constraints[index].clone();
            self.constraints.push(copy);
            self.transformed.insert(ConsId::new(index), ConsId::new(self.constraints.len() - 1));
        }
    }

    pub fn variable_named(&self, name: &str) -> Option<(VarId, &MockVariable)> {
        self.variables
            .iter()
            .enumerate()
            .find(|(_, v)| v.name == name)
            .map(|(i, v)| (VarId::new(i), v))
    }

    pub fn coefficient(&self, constraint: ConsId, variable: VarId) -> Option<f64> {
        self.constraints[constraint.index()]
            .terms
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|&(_, c)| c)
    }

    /// Every (constraint, coefficient) a variable appears in.
    pub fn terms_of(&self, variable: VarId) -> Vec<(ConsId, f64)> {
        let mut terms = Vec::new();
        for (index, constraint) in self.constraints.iter().enumerate() {
            for &(v, c) in &constraint.terms {
                if v == variable {
                    terms.push((ConsId::new(index), c));
                }
            }
        }
        terms
    }

    fn check(&self, operation: &'static str) -> Result<(), MasterError> {
        match self.fail_on {
            Some(failing) if failing == operation => Err(MasterError::new(operation, "injected failure")),
            _ => Ok(()),
        }
    }

    fn constraint(&self, operation: &'static str, constraint: ConsId) -> Result<&MockConstraint, MasterError> {
        self.constraints
            .get(constraint.index())
            .filter(|c| !c.deleted)
            .ok_or_else(|| MasterError::new(operation, format!("no constraint {:?}", constraint)))
    }

    fn constraint_mut(&mut self, operation: &'static str, constraint: ConsId) -> Result<&mut MockConstraint, MasterError> {
        self.constraints
            .get_mut(constraint.index())
            .filter(|c| !c.deleted)
            .ok_or_else(|| MasterError::new(operation, format!("no constraint {:?}", constraint)))
    }
}

impl MasterProblem for MockMaster {
    fn dual_value(&self, constraint: ConsId) -> Result<f64, MasterError> {
        self.check("dual_value")?;
        self.constraint("dual_value", constraint)?;
        Ok(self.duals.get(&constraint).copied().unwrap_or(0.0))
    }

    fn farkas_value(&self, constraint: ConsId) -> Result<f64, MasterError> {
        self.check("farkas_value")?;
        self.constraint("farkas_value", constraint)?;
        Ok(self.farkas.get(&constraint).copied().unwrap_or(0.0))
    }

    fn transformed_constraint(&self, constraint: ConsId) -> Result<ConsId, MasterError> {
        self.check("transformed_constraint")?;
        self.constraint("transformed_constraint", constraint)?;
        Ok(self.transformed.get(&constraint).copied().unwrap_or(constraint))
    }

    fn add_priced_variable(&mut self, name: &str, lower: f64, upper: f64, objective: f64) -> Result<VarId, MasterError> {
        self.check("add_priced_variable")?;
        self.variables.push(MockVariable { name: name.to_string(), lower, upper, objective, committed: false });
        Ok(VarId::new(self.variables.len() - 1))
    }

    fn add_coefficient(&mut self, constraint: ConsId, variable: VarId, coefficient: f64) -> Result<(), MasterError> {
        self.check("add_coefficient")?;
        let target = self.constraint_mut("add_coefficient", constraint)?;
        if !target.modifiable {
            return Err(MasterError::new("add_coefficient", format!("constraint {:?} is not modifiable", constraint)));
        }
        target.terms.push((variable, coefficient));
        Ok(())
    }

    fn commit_variable(&mut self, variable: VarId) -> Result<(), MasterError> {
        self.check("commit_variable")?;
        let var = self
            .variables
            .get_mut(variable.index())
            .ok_or_else(|| MasterError::new("commit_variable", format!("no variable {:?}", variable)))?;
        var.committed = true;
        Ok(())
    }
}

impl MasterModel for MockMaster {
    fn constraints(&self) -> Vec<ConsId> {
        (0..self.constraints.len())
            .filter(|&i| !self.constraints[i].deleted)
            .map(ConsId::new)
            .collect()
    }

    fn constraint_name(&self, constraint: ConsId) -> Result<String, MasterError> {
        Ok(self.constraint("constraint_name", constraint)?.name.clone())
    }

    fn constraint_terms(&self, constraint: ConsId) -> Result<Vec<(VarId, f64)>, MasterError> {
        self.check("constraint_terms")?;
        Ok(self.constraint("constraint_terms", constraint)?.terms.clone())
    }

    fn variable_name(&self, variable: VarId) -> Result<String, MasterError> {
        self.variables
            .get(variable.index())
            .map(|v| v.name.clone())
            .ok_or_else(|| MasterError::new("variable_name", format!("no variable {:?}", variable)))
    }

    fn delete_constraint(&mut self, constraint: ConsId) -> Result<(), MasterError> {
        self.check("delete_constraint")?;
        self.constraint_mut("delete_constraint", constraint)?.deleted = true;
        Ok(())
    }

    fn remove_coefficient(&mut self, constraint: ConsId, variable: VarId) -> Result<(), MasterError> {
        self.check("remove_coefficient")?;
        self.constraint_mut("remove_coefficient", constraint)?
            .terms
            .retain(|(v, _)| *v != variable);
        Ok(())
    }

    fn set_modifiable(&mut self, constraint: ConsId) -> Result<(), MasterError> {
        self.check("set_modifiable")?;
        self.constraint_mut("set_modifiable", constraint)?.modifiable = true;
        Ok(())
    }
}
