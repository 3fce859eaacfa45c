use std::{fmt::Debug, time::Duration};

pub mod mini_lp;
#[cfg(feature = "scip")]
pub mod scip;

#[cfg(not(feature = "scip"))]
pub type DefaultLpSolver = mini_lp::MiniLpSolver;
#[cfg(feature = "scip")]
pub type DefaultLpSolver = scip::ScipSolver;

pub trait ModelBuilder {
    type Variable: Clone;

    fn add_variable(
        &mut self,
        name: &str,
        is_integer: bool,
        obj: f64,
        lb: f64,
        ub: f64,
    ) -> Self::Variable;
    fn add_constraint(
        &mut self,
        name: &str,
        vars: &[Self::Variable],
        coeffs: &[f64],
        lb: Option<f64>,
        ub: Option<f64>,
    );
}

pub trait ModelCreating {
    type Model;
    fn build(self) -> Self::Model;
}

pub trait ModelReady {
    type SolvedModel: ModelSolved;
    fn solve(self) -> Self::SolvedModel;

    fn set_time_limit(self, duration: Duration) -> Self;
}

pub trait ModelSolved {
    type Solution: SolutionTrait;

    fn is_optimal(&self) -> bool;
    fn get_solutions(&self, max_count: usize) -> Vec<Self::Solution>;
    /// Human readable solver status, used in error reports.
    fn status(&self) -> String;
}

pub trait SolutionTrait {
    type Variable;
    fn get_value(&self, var: &Self::Variable) -> f64;
    fn get_values(&self, vars: &[Self::Variable]) -> Vec<f64>;
    fn get_objective_value(&self) -> f64;
}

pub trait VariableTrait {
    fn get_obj(&self) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub enum ObjSense {
    Minimize,
    Maximize,
}

pub trait LpSolver: Clone + Debug {
    type Variable: Clone + Debug + VariableTrait;
    type Solution: SolutionTrait<Variable = Self::Variable>;
    type ModelInit: ModelBuilder<Variable = Self::Variable> + ModelCreating<Model = Self::Model>;
    type Model: ModelBuilder<Variable = Self::Variable> + ModelReady<SolvedModel = Self::SolvedModel>;
    type SolvedModel: ModelSolved<Solution = Self::Solution>;

    fn create_new_model(name: &str, verbose: bool, sense: ObjSense) -> Self::ModelInit;
}
