//! The cut-and-shoot MILP
//!
//! Jointly decides vertex→subcircuit assignment, which DAG edges are cut,
//! and how many shots of each subcircuit run on each QPU. The formulation:
//!
//! - `y[v,c]` vertex membership, `x[e,c]` edge-cut indicators
//! - `z_o = x·y[src]`, `z_p = x·y[tgt]` linearised products
//! - per-subcircuit accounting `a, p, o, f, d`
//! - `shots_assign[c,q]` with eligibility gates `enable[c,q]` and the big-M
//!   capacity coupling `d[c] ≤ cap(q) + M(1 − enable[c,q])`
//! - the three-part per-QPU time model and the makespan `T`
//!
//! Objective: `α·K/K_max + β·T/T_max` where `K = ½·Σ x[e,c]`.
//!
//! The solver is a pluggable black box; the crate ships `good_lp`'s default
//! branch-and-bound backend. No time budget is enforced here.

use crate::{CutEdge, CutPlan, CutterError, QpuRegistry, Result, SubcircuitSolution};
use cutshot_circuits::CircuitDag;
use good_lp::{
    constraint, default_solver, variable, Constraint, Expression, ProblemVariables,
    ResolutionError, Solution, SolverModel, Variable,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// The MILP instance for one circuit and one QPU fleet
pub struct CutModel<'a> {
    edges: Vec<(usize, usize)>,
    vertex_weights: Vec<u64>,
    qpus: &'a QpuRegistry,
    shots_per_subcircuit: u64,
    num_subcircuits: usize,
    alpha: f64,
    beta: f64,
}

/// All decision variables, indexed the way the formulation reads
struct ModelVars {
    y: Vec<Vec<Variable>>,       // [v][c]
    x: Vec<Vec<Variable>>,       // [e][c]
    z_o: Vec<Vec<Variable>>,     // [e][c]
    z_p: Vec<Vec<Variable>>,     // [e][c]
    a: Vec<Variable>,            // [c]
    p: Vec<Variable>,            // [c]
    o: Vec<Variable>,            // [c]
    f: Vec<Variable>,            // [c]
    d: Vec<Variable>,            // [c]
    u: Vec<Variable>,            // [c]
    shots: Vec<Vec<Variable>>,   // [c][q]
    use_q: Vec<Variable>,        // [q]
    enable: Vec<Vec<Variable>>,  // [c][q]
    t_q: Vec<Variable>,          // [q]
    t: Variable,
}

impl<'a> CutModel<'a> {
    /// Create a model over explicit graph data
    pub fn new(
        edges: Vec<(usize, usize)>,
        vertex_weights: Vec<u64>,
        qpus: &'a QpuRegistry,
        shots_per_subcircuit: u64,
        num_subcircuits: usize,
        alpha: f64,
        beta: f64,
    ) -> Result<Self> {
        if alpha < 0.0 {
            return Err(CutterError::Config(
                "alpha must be greater than or equal to 0".to_string(),
            ));
        }
        if beta < 0.0 {
            return Err(CutterError::Config(
                "beta must be greater than or equal to 0".to_string(),
            ));
        }
        if (alpha + beta - 1.0).abs() > 1e-9 {
            return Err(CutterError::Config("alpha + beta must equal 1".to_string()));
        }
        if shots_per_subcircuit == 0 {
            return Err(CutterError::Config(
                "shots per subcircuit must be positive".to_string(),
            ));
        }
        if num_subcircuits == 0 {
            return Err(CutterError::Config(
                "at least one subcircuit slot is required".to_string(),
            ));
        }
        if qpus.is_empty() {
            return Err(CutterError::Config("the QPU registry is empty".to_string()));
        }
        if vertex_weights.is_empty() {
            return Err(CutterError::Config(
                "the circuit has no gate vertices".to_string(),
            ));
        }
        for &(s, t) in &edges {
            if s >= vertex_weights.len() || t >= vertex_weights.len() {
                return Err(CutterError::Config(format!(
                    "edge ({s}, {t}) references an unknown vertex"
                )));
            }
        }
        Ok(Self {
            edges,
            vertex_weights,
            qpus,
            shots_per_subcircuit,
            num_subcircuits,
            alpha,
            beta,
        })
    }

    /// Create a model from an extracted circuit DAG
    pub fn from_dag(
        dag: &CircuitDag,
        qpus: &'a QpuRegistry,
        shots_per_subcircuit: u64,
        num_subcircuits: usize,
        alpha: f64,
        beta: f64,
    ) -> Result<Self> {
        Self::new(
            dag.edges().to_vec(),
            dag.vertex_weights(),
            qpus,
            shots_per_subcircuit,
            num_subcircuits,
            alpha,
            beta,
        )
    }

    /// Big-M bound on d[c]: no subcircuit can need more input qubits than
    /// the full weight sum plus one init qubit per edge
    fn big_m(&self) -> f64 {
        self.vertex_weights.iter().sum::<u64>() as f64 + self.edges.len() as f64
    }

    /// Worst-case makespan: every subcircuit's shots on the slowest QPU
    fn t_max(&self) -> f64 {
        let total_shots = (self.num_subcircuits as u64 * self.shots_per_subcircuit) as f64;
        self.qpus
            .iter()
            .map(|q| q.queue_time as f64 + total_shots * q.execution_time as f64)
            .fold(0.0, f64::max)
    }

    fn declare_variables(&self, vars: &mut ProblemVariables) -> ModelVars {
        let n_v = self.vertex_weights.len();
        let n_e = self.edges.len();
        let n_c = self.num_subcircuits;
        let n_q = self.qpus.len();
        let big_m = self.big_m();
        let shots_max = self.shots_per_subcircuit as f64;

        let binary_grid = |vars: &mut ProblemVariables, rows: usize, cols: usize| {
            (0..rows)
                .map(|_| (0..cols).map(|_| vars.add(variable().binary())).collect())
                .collect::<Vec<Vec<Variable>>>()
        };

        let y = binary_grid(vars, n_v, n_c);
        let x = binary_grid(vars, n_e, n_c);
        let z_o = binary_grid(vars, n_e, n_c);
        let z_p = binary_grid(vars, n_e, n_c);

        let counter =
            |vars: &mut ProblemVariables| vars.add(variable().integer().min(0.0).max(big_m));
        let a: Vec<Variable> = (0..n_c).map(|_| counter(vars)).collect();
        let p: Vec<Variable> = (0..n_c).map(|_| counter(vars)).collect();
        let o: Vec<Variable> = (0..n_c).map(|_| counter(vars)).collect();
        let d: Vec<Variable> = (0..n_c).map(|_| counter(vars)).collect();
        let f: Vec<Variable> = (0..n_c)
            .map(|_| vars.add(variable().integer().min(-big_m).max(big_m)))
            .collect();

        let u: Vec<Variable> = (0..n_c).map(|_| vars.add(variable().binary())).collect();

        let shots: Vec<Vec<Variable>> = (0..n_c)
            .map(|_| {
                (0..n_q)
                    .map(|_| vars.add(variable().integer().min(0.0).max(shots_max)))
                    .collect()
            })
            .collect();

        let use_q: Vec<Variable> = (0..n_q).map(|_| vars.add(variable().binary())).collect();
        let enable = binary_grid(vars, n_c, n_q);
        let t_q: Vec<Variable> = (0..n_q).map(|_| vars.add(variable().min(0.0))).collect();
        let t = vars.add(variable().min(0.0));

        ModelVars {
            y,
            x,
            z_o,
            z_p,
            a,
            p,
            o,
            f,
            d,
            u,
            shots,
            use_q,
            enable,
            t_q,
            t,
        }
    }

    fn build_constraints(&self, v: &ModelVars) -> Vec<Constraint> {
        let n_v = self.vertex_weights.len();
        let n_c = self.num_subcircuits;
        let n_q = self.qpus.len();
        let big_m = self.big_m();
        let shots_f = self.shots_per_subcircuit as f64;

        let mut cons: Vec<Constraint> = Vec::new();

        // Subcircuit accounting: a, p, o, f, d
        for c in 0..n_c {
            let weighted: Expression = (0..n_v)
                .map(|vx| v.y[vx][c] * (self.vertex_weights[vx] as f64))
                .sum();
            cons.push(constraint!(weighted == v.a[c]));

            let p_sum: Expression = v.z_p.iter().map(|row| row[c] * 1.0).sum();
            cons.push(constraint!(p_sum == v.p[c]));

            let o_sum: Expression = v.z_o.iter().map(|row| row[c] * 1.0).sum();
            cons.push(constraint!(o_sum == v.o[c]));

            cons.push(constraint!(v.a[c] + v.p[c] - v.o[c] == v.f[c]));
            cons.push(constraint!(v.a[c] + v.p[c] == v.d[c]));
        }

        // Linearisation: z_p = x·y[target], z_o = x·y[source]
        for (e, &(src, tgt)) in self.edges.iter().enumerate() {
            for c in 0..n_c {
                cons.push(constraint!(v.z_p[e][c] <= v.x[e][c]));
                cons.push(constraint!(v.z_p[e][c] <= v.y[tgt][c]));
                cons.push(constraint!(v.z_p[e][c] >= v.x[e][c] + v.y[tgt][c] - 1.0));

                cons.push(constraint!(v.z_o[e][c] <= v.x[e][c]));
                cons.push(constraint!(v.z_o[e][c] <= v.y[src][c]));
                cons.push(constraint!(v.z_o[e][c] >= v.x[e][c] + v.y[src][c] - 1.0));
            }
        }

        // Every vertex lands in exactly one subcircuit
        for vx in 0..n_v {
            let membership: Expression = (0..n_c).map(|c| v.y[vx][c] * 1.0).sum();
            cons.push(constraint!(membership == 1.0));
        }

        // x[e,c] is 1 exactly when e has one endpoint in c
        for (e, &(src, tgt)) in self.edges.iter().enumerate() {
            for c in 0..n_c {
                cons.push(constraint!(v.x[e][c] <= v.y[src][c] + v.y[tgt][c]));
                cons.push(constraint!(v.x[e][c] >= v.y[src][c] - v.y[tgt][c]));
                cons.push(constraint!(v.x[e][c] >= v.y[tgt][c] - v.y[src][c]));
                cons.push(constraint!(v.x[e][c] + v.y[src][c] + v.y[tgt][c] <= 2.0));
            }
        }

        // Symmetry break: vertex k may not sit in any later-indexed subcircuit
        for k in 0..n_v.min(n_c) {
            if k + 1 >= n_c {
                break;
            }
            let later: Expression = (k + 1..n_c).map(|j| v.y[k][j] * 1.0).sum();
            cons.push(constraint!(later == 0.0));
        }

        // Non-empty indicator: d[c] > 0 forces u[c] = 1
        for c in 0..n_c {
            cons.push(constraint!(v.d[c] <= v.u[c] * big_m));
        }

        // Each non-empty subcircuit receives exactly S shots
        for c in 0..n_c {
            let assigned: Expression = (0..n_q).map(|q| v.shots[c][q] * 1.0).sum();
            cons.push(constraint!(assigned == v.u[c] * shots_f));
        }

        // QPU activation: assigned shots force use_q
        let m_shots = (self.num_subcircuits as u64 * self.shots_per_subcircuit) as f64;
        for q in 0..n_q {
            let load: Expression = (0..n_c).map(|c| v.shots[c][q] * 1.0).sum();
            cons.push(constraint!(load <= v.use_q[q] * m_shots));
        }

        // Capacity gating through eligibility
        for c in 0..n_c {
            for (q, qpu) in self.qpus.iter().enumerate() {
                let cap = qpu.capacity as f64;
                cons.push(constraint!(
                    v.d[c] + v.enable[c][q] * big_m <= cap + big_m
                ));
                cons.push(constraint!(v.shots[c][q] <= v.enable[c][q] * shots_f));
            }
        }

        // Per-QPU time model and makespan
        for (q, qpu) in self.qpus.iter().enumerate() {
            let queue = qpu.queue_time as f64;
            let exec = qpu.execution_time as f64;
            let exec_load: Expression = (0..n_c).map(|c| v.shots[c][q] * exec).sum();

            cons.push(constraint!(v.t_q[q] >= v.use_q[q] * queue));
            cons.push(constraint!(v.t_q[q] >= exec_load.clone()));
            cons.push(constraint!(v.t_q[q] <= v.use_q[q] * queue + exec_load));
            cons.push(constraint!(v.t >= v.t_q[q]));
        }

        cons
    }

    fn build_objective(&self, v: &ModelVars) -> Expression {
        let k_max = self.edges.len() as f64 / 2.0;
        let t_max = self.t_max();

        let mut terms: Vec<Expression> = Vec::new();
        if k_max > 0.0 {
            // K = ½·Σ x[e,c]; each cut edge is counted in both owners
            for row in &v.x {
                for &var in row {
                    terms.push(var * (0.5 * self.alpha / k_max));
                }
            }
        }
        if t_max > 0.0 {
            terms.push(v.t * (self.beta / t_max));
        }
        terms.into_iter().sum()
    }

    /// Solve the model and extract the plan
    ///
    /// Infeasibility is a sentinel error, not a panic; the caller decides
    /// whether to skip reconstruction or abort.
    pub fn solve(&self) -> Result<CutPlan> {
        let mut vars = ProblemVariables::new();
        let v = self.declare_variables(&mut vars);
        let objective = self.build_objective(&v);

        let mut model = vars.minimise(objective).using(default_solver);
        let constraints = self.build_constraints(&v);
        let n_constraints = constraints.len();
        for c in constraints {
            model = model.with(c);
        }

        info!(
            vertices = self.vertex_weights.len(),
            edges = self.edges.len(),
            subcircuits = self.num_subcircuits,
            qpus = self.qpus.len(),
            constraints = n_constraints,
            "solving cut-and-shoot model"
        );

        let solution = model.solve().map_err(|e| match e {
            ResolutionError::Infeasible => CutterError::Infeasible,
            other => CutterError::Solver(other.to_string()),
        })?;

        self.extract_plan(&v, &solution)
    }

    fn extract_plan(&self, v: &ModelVars, solution: &impl Solution) -> Result<CutPlan> {
        let n_c = self.num_subcircuits;
        let n_q = self.qpus.len();
        let value = |var: Variable| solution.value(var);
        let is_one = |var: Variable| value(var) > 0.5;

        // Vertex membership
        let mut assignment = vec![usize::MAX; self.vertex_weights.len()];
        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (vx, row) in v.y.iter().enumerate() {
            for (c, &var) in row.iter().enumerate() {
                if is_one(var) {
                    assignment[vx] = c;
                    members.entry(c).or_default().push(vx);
                    break;
                }
            }
        }
        if assignment.contains(&usize::MAX) {
            return Err(CutterError::Solver(
                "solution leaves a vertex unassigned".to_string(),
            ));
        }

        // Cuts: edges whose endpoints land in different subcircuits.
        // Cut ids follow the deterministic sorted edge order.
        let mut subcircuits: BTreeMap<usize, SubcircuitSolution> = members
            .iter()
            .map(|(&c, verts)| {
                (
                    c,
                    SubcircuitSolution {
                        id: c,
                        vertices: verts.clone(),
                        shots: BTreeMap::new(),
                        cuts: Default::default(),
                        gate_qubits: value(v.a[c]).round() as i64,
                        init_qubits: value(v.p[c]).round() as i64,
                        measured_qubits: value(v.o[c]).round() as i64,
                        input_qubits: value(v.d[c]).round() as i64,
                        contributing_qubits: value(v.f[c]).round() as i64,
                    },
                )
            })
            .collect();

        let mut num_cuts = 0;
        for &(src, tgt) in &self.edges {
            let (cs, ct) = (assignment[src], assignment[tgt]);
            if cs == ct {
                continue;
            }
            let cut = CutEdge {
                id: num_cuts,
                edge: (src, tgt),
            };
            num_cuts += 1;
            if let Some(sub) = subcircuits.get_mut(&cs) {
                sub.cuts.outgoing.push(cut);
            }
            if let Some(sub) = subcircuits.get_mut(&ct) {
                sub.cuts.incoming.push(cut);
            }
        }

        // Cross-check against the model's own cut count
        let x_total: f64 = v.x.iter().flatten().map(|&var| value(var)).sum();
        debug!(
            num_cuts,
            x_half_sum = x_total / 2.0,
            "cut count extracted from assignment"
        );

        // Shot assignment
        for c in 0..n_c {
            let Some(sub) = subcircuits.get_mut(&c) else {
                continue;
            };
            for q in 0..n_q {
                let assigned = value(v.shots[c][q]).round() as u64;
                if assigned > 0 {
                    sub.shots.insert(self.qpus.as_slice()[q].index, assigned);
                }
            }
        }

        let qpu_times: BTreeMap<usize, f64> = (0..n_q)
            .filter_map(|q| {
                let t_q = value(v.t_q[q]);
                (t_q > 0.0).then_some((self.qpus.as_slice()[q].index, t_q))
            })
            .collect();

        let makespan = value(v.t);
        let k_max = self.edges.len() as f64 / 2.0;
        let t_max = self.t_max();
        let mut objective = 0.0;
        if k_max > 0.0 {
            objective += self.alpha * num_cuts as f64 / k_max;
        }
        if t_max > 0.0 {
            objective += self.beta * makespan / t_max;
        }

        let plan = CutPlan {
            subcircuits: subcircuits.into_values().collect(),
            num_cuts,
            makespan,
            objective,
            qpu_times,
        };

        info!(
            subcircuits = plan.subcircuits.len(),
            num_cuts = plan.num_cuts,
            makespan = plan.makespan,
            objective = plan.objective,
            "cut-and-shoot model solved"
        );

        Ok(plan)
    }
}
