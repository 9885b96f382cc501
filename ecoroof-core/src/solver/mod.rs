//! Iterative solvers for surface node temperatures.

mod newton;

pub use newton::{
    solve, Bracket, IterationHistory, ResidualFunction, Solution, SolutionMethod, SolverSettings,
};
