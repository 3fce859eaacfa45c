use std::time::{Duration, Instant};

use ::minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};

use super::{
    LpSolver, ModelBuilder, ModelCreating, ModelReady, ModelSolved, ObjSense, SolutionTrait,
    VariableTrait,
};

/// Pure Rust dense simplex backend. Continuous variables only.
#[derive(Clone, Copy, Debug)]
pub struct MiniLpSolver;

#[derive(Clone, Copy, Debug)]
pub struct MiniLpVariable {
    index: usize,
    obj: f64,
}

impl VariableTrait for MiniLpVariable {
    fn get_obj(&self) -> f64 {
        self.obj
    }
}

#[derive(Clone, Debug)]
pub struct MiniLpSolution {
    values: Vec<f64>,
    objective: f64,
}

impl SolutionTrait for MiniLpSolution {
    type Variable = MiniLpVariable;

    fn get_value(&self, var: &Self::Variable) -> f64 {
        self.values[var.index]
    }

    fn get_values(&self, vars: &[Self::Variable]) -> Vec<f64> {
        vars.iter().map(|v| self.values[v.index]).collect()
    }

    fn get_objective_value(&self) -> f64 {
        self.objective
    }
}

pub struct MiniLpModel {
    name: String,
    problem: Problem,
    variables: Vec<::minilp::Variable>,
    constraints_count: usize,
    time_limit: Option<Duration>,
    verbose: bool,
}

impl ModelBuilder for MiniLpModel {
    type Variable = MiniLpVariable;

    fn add_variable(
        &mut self,
        name: &str,
        is_integer: bool,
        obj: f64,
        lb: f64,
        ub: f64,
    ) -> Self::Variable {
        if is_integer {
            log::warn!(
                "Variable {} relaxed to continuous, integrality is not supported",
                name
            );
        }
        let index = self.variables.len();
        self.variables.push(self.problem.add_var(obj, (lb, ub)));
        MiniLpVariable { index, obj }
    }

    fn add_constraint(
        &mut self,
        name: &str,
        vars: &[Self::Variable],
        coeffs: &[f64],
        lb: Option<f64>,
        ub: Option<f64>,
    ) {
        let expr = || {
            let mut expr = LinearExpr::empty();
            for (var, &coeff) in vars.iter().zip(coeffs.iter()) {
                expr.add(self.variables[var.index], coeff);
            }
            expr
        };

        let bounds = match (lb, ub) {
            (Some(lb), Some(ub)) if lb == ub => vec![(ComparisonOp::Eq, lb)],
            (lb, ub) => lb
                .map(|lb| (ComparisonOp::Ge, lb))
                .into_iter()
                .chain(ub.map(|ub| (ComparisonOp::Le, ub)))
                .collect(),
        };

        if bounds.is_empty() {
            log::debug!("Constraint {} has no bounds, skipped", name);
            return;
        }

        let rows: Vec<_> = bounds.into_iter().map(|(op, rhs)| (expr(), op, rhs)).collect();
        for (expr, op, rhs) in rows {
            self.problem.add_constraint(expr, op, rhs);
            self.constraints_count += 1;
        }
    }
}

impl ModelCreating for MiniLpModel {
    type Model = MiniLpModel;
    fn build(self) -> Self::Model {
        self
    }
}

pub struct MiniLpSolvedModel {
    outcome: Result<MiniLpSolution, ::minilp::Error>,
    elapsed: Duration,
    timed_out: bool,
}

impl ModelReady for MiniLpModel {
    type SolvedModel = MiniLpSolvedModel;

    fn solve(self) -> Self::SolvedModel {
        if self.verbose {
            log::info!(
                "Solving {}: {} variables, {} constraints",
                self.name,
                self.variables.len(),
                self.constraints_count
            );
        }

        let start = Instant::now();
        let outcome = self.problem.solve().map(|solution| MiniLpSolution {
            values: self.variables.iter().map(|&v| solution[v]).collect(),
            objective: solution.objective(),
        });
        let elapsed = start.elapsed();

        // The simplex cannot be interrupted, overruns are reported afterwards
        let timed_out = self.time_limit.map(|limit| elapsed >= limit).unwrap_or(false);

        if self.verbose {
            log::info!("Solved {} in {:.2?}", self.name, elapsed);
        }

        MiniLpSolvedModel {
            outcome,
            elapsed,
            timed_out,
        }
    }

    fn set_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }
}

impl ModelSolved for MiniLpSolvedModel {
    type Solution = MiniLpSolution;

    fn is_optimal(&self) -> bool {
        self.outcome.is_ok() && !self.timed_out
    }

    fn get_solutions(&self, max_count: usize) -> Vec<Self::Solution> {
        self.outcome.iter().take(max_count).cloned().collect()
    }

    fn status(&self) -> String {
        match &self.outcome {
            _ if self.timed_out => format!("time limit exceeded ({:.2?})", self.elapsed),
            Ok(_) => "optimal".to_string(),
            Err(err) => err.to_string(),
        }
    }
}

impl LpSolver for MiniLpSolver {
    type Variable = MiniLpVariable;
    type Solution = MiniLpSolution;

    type ModelInit = MiniLpModel;
    type Model = MiniLpModel;

    type SolvedModel = MiniLpSolvedModel;

    fn create_new_model(name: &str, verbose: bool, sense: ObjSense) -> Self::ModelInit {
        let direction = match sense {
            ObjSense::Minimize => OptimizationDirection::Minimize,
            ObjSense::Maximize => OptimizationDirection::Maximize,
        };

        MiniLpModel {
            name: name.to_string(),
            problem: Problem::new(direction),
            variables: vec![],
            constraints_count: 0,
            time_limit: None,
            verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximizes_small_program() {
        // max x + 2y, x + y <= 4, 0 <= x <= 3, 0 <= y <= 1
        let mut model = MiniLpSolver::create_new_model("small", false, ObjSense::Maximize);
        let x = model.add_variable("x", false, 1.0, 0.0, 3.0);
        let y = model.add_variable("y", false, 2.0, 0.0, 1.0);
        model.add_constraint("sum", &[x, y], &[1.0, 1.0], None, Some(4.0));

        let solved = model.build().solve();
        assert!(solved.is_optimal());
        assert_eq!(solved.status(), "optimal");

        let solution = solved.get_solutions(1).swap_remove(0);
        assert!((solution.get_objective_value() - 5.0).abs() < 1e-9);
        let values = solution.get_values(&[x, y]);
        assert!((values[0] - 3.0).abs() < 1e-9);
        assert!((values[1] - 1.0).abs() < 1e-9);
        assert_eq!(y.get_obj(), 2.0);
    }

    #[test]
    fn equality_constraint_is_respected() {
        let mut model = MiniLpSolver::create_new_model("eq", false, ObjSense::Maximize);
        let x = model.add_variable("x", false, 1.0, 0.0, f64::INFINITY);
        let y = model.add_variable("y", false, 0.0, 0.0, 2.5);
        model.add_constraint("x_eq_y", &[x, y], &[1.0, -1.0], Some(0.0), Some(0.0));

        let solved = model.build().solve();
        let solution = solved.get_solutions(1).swap_remove(0);
        assert!((solution.get_value(&x) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn infeasible_program_is_not_optimal() {
        let mut model = MiniLpSolver::create_new_model("infeasible", false, ObjSense::Maximize);
        let x = model.add_variable("x", false, 1.0, 0.0, 1.0);
        model.add_constraint("too_big", &[x], &[1.0], Some(2.0), None);

        let solved = model.build().solve();
        assert!(!solved.is_optimal());
        assert!(solved.get_solutions(1).is_empty());
    }

    #[test]
    fn overrun_time_limit_is_not_optimal() {
        let mut model = MiniLpSolver::create_new_model("late", false, ObjSense::Maximize);
        let x = model.add_variable("x", false, 1.0, 0.0, 1.0);
        model.add_constraint("cap", &[x], &[1.0], None, Some(1.0));

        let solved = model.build().set_time_limit(Duration::ZERO).solve();
        assert!(!solved.is_optimal());
        assert!(solved.status().starts_with("time limit exceeded"));
    }
}
