//! SABRE-style qubit routing and initial layout.
//!
//! Two-qubit gates may only act on physically adjacent qubits. This pass
//! picks a logical→physical layout and inserts SWAP gates so every two-qubit
//! gate executes on a coupled pair, steering SWAP selection with a
//! nearest-neighbor cost over the ready gates plus a discounted lookahead
//! term. The layout itself is refined by routing the circuit forward,
//! backward, and forward again; the last forward round is the one kept.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use tracing::debug;

use grani_ir::{Chip, Circuit, Gate, Op, UNREACHABLE};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;

/// How far past the front layer the lookahead window reaches.
const FUTURE_WINDOW: usize = 20;

/// Weight of the lookahead term in the SWAP cost.
const FUTURE_WEIGHT: f64 = 0.5;

/// SABRE routing pass.
///
/// Rewrites the gate list into physical-qubit space and records the layout
/// in effect for the first emitted gate as the circuit's `initial_mapping`.
/// The only randomness is the starting permutation of the first refinement
/// round; fix it with [`with_seed`](SabreRouting::with_seed) for
/// reproducible output.
pub struct SabreRouting {
    seed: Option<u64>,
}

impl SabreRouting {
    /// Create a routing pass with an entropy-seeded starting layout.
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Create a routing pass with a fixed seed for the starting layout.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Default for SabreRouting {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for SabreRouting {
    fn name(&self) -> &'static str {
        "SabreRouting"
    }

    fn run(&self, circuit: &mut Circuit, chip: &Chip) -> CompileResult<()> {
        let n_qubits = circuit.num_qubits();
        if n_qubits > chip.num_qubits() {
            return Err(CompileError::ChipTooSmall {
                n_qubits,
                chip_qubit_num: chip.num_qubits(),
            });
        }

        let plan = RoutingPlan::extract(circuit);

        let mut rng: StdRng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        #[allow(clippy::cast_possible_truncation)]
        let mut mapping: Vec<u32> = (0..n_qubits as u32).collect();
        mapping.shuffle(&mut rng);

        // Round 1: forward from the random layout. Output discarded; the
        // final layout seeds the next round.
        let outcome = route_round(&mut mapping, &plan.forward(), chip)?;
        debug!(swaps = outcome.swaps, "routing round 1 complete");

        // Round 2: the circuit run backwards. Routing the reversed gate
        // order from the round-1 layout lands on a layout suited to the
        // start of the forward circuit.
        let outcome = route_round(&mut mapping, &plan.reversed(), chip)?;
        debug!(swaps = outcome.swaps, "routing round 2 complete");

        // Round 3: forward again. This round's gate list is the result and
        // its entry layout is the circuit's initial mapping.
        let initial_mapping = mapping.clone();
        let outcome = route_round(&mut mapping, &plan.forward(), chip)?;
        debug!(
            swaps = outcome.swaps,
            gates = outcome.gates.len(),
            "routing round 3 complete"
        );

        circuit.set_initial_mapping(initial_mapping);
        circuit.set_gates(outcome.gates);
        Ok(())
    }
}

/// The routed subcircuit, split as the router sees it.
///
/// Only two-qubit gates participate in dependency analysis and SWAP
/// selection. Single-qubit gates ride along: each two-qubit gate remembers
/// the singles that appeared on its qubits since the previous two-qubit
/// gate there, and flushes them (translated through the current layout)
/// just before it executes. Singles after the last two-qubit gate on their
/// qubit are appended at the end. Measure-all markers are dropped; the
/// emitter reconstructs measurement from the classical registers.
struct RoutingPlan {
    twoq: Vec<Gate>,
    pairs: Vec<(u32, u32)>,
    singles: Vec<Gate>,
    pending: Vec<Vec<usize>>,
    leftover: Vec<usize>,
}

/// One round's view of the plan: forward or reversed gate order.
struct RoundInput<'a> {
    twoq: Vec<&'a Gate>,
    pairs: Vec<(u32, u32)>,
    singles: &'a [Gate],
    pending: &'a [Vec<usize>],
    leftover: &'a [usize],
}

/// Result of one routing round.
struct RoundOutcome {
    gates: Vec<Gate>,
    swaps: usize,
}

impl RoutingPlan {
    fn extract(circuit: &Circuit) -> Self {
        let mut twoq = Vec::new();
        let mut pairs = Vec::new();
        let mut singles: Vec<Gate> = Vec::new();
        let mut pending: Vec<Vec<usize>> = Vec::new();
        let mut waiting: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        let mut consumed = Vec::new();

        for gate in circuit.gates() {
            if gate.op == Op::MA {
                continue;
            }
            if let Some(ctrl) = gate.ctrl {
                let mut flush = Vec::new();
                for q in [ctrl, gate.qubit] {
                    if let Some(indices) = waiting.remove(&q) {
                        flush.extend(indices);
                    }
                }
                for &idx in &flush {
                    consumed.push(idx);
                }
                pending.push(flush);
                pairs.push((ctrl, gate.qubit));
                twoq.push(gate.clone());
            } else {
                waiting.entry(gate.qubit).or_default().push(singles.len());
                singles.push(gate.clone());
            }
        }

        let consumed: std::collections::HashSet<usize> = consumed.into_iter().collect();
        let leftover = (0..singles.len()).filter(|i| !consumed.contains(i)).collect();

        Self {
            twoq,
            pairs,
            singles,
            pending,
            leftover,
        }
    }

    fn forward(&self) -> RoundInput<'_> {
        RoundInput {
            twoq: self.twoq.iter().collect(),
            pairs: self.pairs.clone(),
            singles: &self.singles,
            pending: &self.pending,
            leftover: &self.leftover,
        }
    }

    /// Reversed gate order for the backward round. The backward round's
    /// output is discarded, so no singles are attached.
    fn reversed(&self) -> RoundInput<'_> {
        RoundInput {
            twoq: self.twoq.iter().rev().collect(),
            pairs: self.pairs.iter().rev().copied().collect(),
            singles: &self.singles,
            pending: &[],
            leftover: &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unseen,
    Future,
    Current,
    Executed,
}

/// Dependency DAG over the two-qubit subcircuit, stored struct-of-arrays.
///
/// Gate `i → j` iff `j` is the earliest later gate sharing a qubit with
/// `i`; the shared qubit's slot in `i` selects the successor slot.
/// `deps[j]` counts the distinct unexecuted predecessors (0, 1 or 2), so a
/// gate is promoted to the current layer only when every gate it depends on
/// has executed.
struct DepDag {
    deps: Vec<u8>,
    state: Vec<NodeState>,
    successors: Vec<[Option<usize>; 2]>,
    first_layer: Vec<usize>,
}

impl DepDag {
    fn build(pairs: &[(u32, u32)], n_logical: usize) -> Self {
        let gate_num = pairs.len();
        let mut deps = vec![0u8; gate_num];
        let mut state = vec![NodeState::Unseen; gate_num];
        let mut successors = vec![[None; 2]; gate_num];
        let mut first_layer = Vec::new();
        let mut last: Vec<Option<usize>> = vec![None; n_logical];

        for (i, &(a, b)) in pairs.iter().enumerate() {
            let prior_a = last[a as usize];
            let prior_b = last[b as usize];
            match (prior_a, prior_b) {
                (None, None) => {
                    first_layer.push(i);
                    state[i] = NodeState::Current;
                }
                (Some(x), Some(y)) if x != y => deps[i] = 2,
                _ => deps[i] = 1,
            }

            for &q in &[a, b] {
                if let Some(prior) = last[q as usize] {
                    let slot = usize::from(pairs[prior].0 != q);
                    successors[prior][slot] = Some(i);
                }
                last[q as usize] = Some(i);
            }
        }

        Self {
            deps,
            state,
            successors,
            first_layer,
        }
    }

    /// Distinct successor gates of `gate` (a gate sharing both qubits
    /// occupies both slots but is reported once).
    fn distinct_successors(&self, gate: usize) -> impl Iterator<Item = usize> + '_ {
        let [a, b] = self.successors[gate];
        let b = if b == a { None } else { b };
        a.into_iter().chain(b)
    }
}

/// Route one pass over the gate order in `input`, mutating `mapping` to the
/// layout left behind at the end of the round.
fn route_round(
    mapping: &mut Vec<u32>,
    input: &RoundInput<'_>,
    chip: &Chip,
) -> CompileResult<RoundOutcome> {
    let gate_num = input.pairs.len();
    let qubit_num = chip.num_qubits();

    let mut dag = DepDag::build(&input.pairs, mapping.len());
    let mut current = dag.first_layer.clone();
    let mut future: Vec<usize> = Vec::new();
    refill_future(&mut dag, &current, &mut future, gate_num);

    let mut l2p = mapping.clone();
    let mut p2l: Vec<Option<u32>> = vec![None; qubit_num];
    #[allow(clippy::cast_possible_truncation)]
    for (logical, &physical) in l2p.iter().enumerate() {
        p2l[physical as usize] = Some(logical as u32);
    }

    let mut gates = Vec::with_capacity(input.twoq.len() + input.singles.len());
    let mut swaps = 0usize;
    let mut executed = 0usize;

    while executed < gate_num {
        let ready = executable_gates(&current, &input.pairs, &l2p, chip)?;

        if ready.is_empty() {
            let Some((p, q)) = pick_one_movement(&l2p, &p2l, &current, &future, &input.pairs, chip)
            else {
                let (a, b) = input.pairs[current[0]];
                return Err(CompileError::Unroutable {
                    pair: (l2p[a as usize] as usize, l2p[b as usize] as usize),
                });
            };
            let lp = p2l[p];
            let lq = p2l[q];
            if let Some(l) = lp {
                l2p[l as usize] = q as u32;
            }
            if let Some(l) = lq {
                l2p[l as usize] = p as u32;
            }
            p2l[p] = lq;
            p2l[q] = lp;
            gates.push(Gate::swap(p as u32, q as u32));
            swaps += 1;
            continue;
        }

        for &g in &ready {
            if let Some(flushed) = input.pending.get(g) {
                for &s in flushed {
                    gates.push(map_single(&input.singles[s], &l2p));
                }
            }
            gates.push(map_two(input.twoq[g], &l2p));
        }
        executed += ready.len();
        maintain_layer(&mut dag, &mut current, &mut future, &ready, gate_num);
    }

    for &s in input.leftover {
        gates.push(map_single(&input.singles[s], &l2p));
    }

    *mapping = l2p;
    Ok(RoundOutcome { gates, swaps })
}

/// Gates of the current layer whose mapped endpoints are coupled.
fn executable_gates(
    current: &[usize],
    pairs: &[(u32, u32)],
    l2p: &[u32],
    chip: &Chip,
) -> CompileResult<Vec<usize>> {
    let mut ready = Vec::new();
    for &g in current {
        let (a, b) = pairs[g];
        let pa = l2p[a as usize] as usize;
        let pb = l2p[b as usize] as usize;
        let distance = chip.distance(pa, pb);
        if distance == UNREACHABLE {
            return Err(CompileError::Unroutable { pair: (pa, pb) });
        }
        if distance == 1 {
            ready.push(g);
        }
    }
    Ok(ready)
}

/// Pick the SWAP that minimizes the layer cost.
///
/// Candidates are every coupling edge touching a physical qubit of a
/// current-layer gate, scored against the layout that would result from
/// the swap. Ties keep the first candidate seen, which is deterministic:
/// the current layer is sorted by gate index and neighbor lists are in
/// index order.
fn pick_one_movement(
    l2p: &[u32],
    p2l: &[Option<u32>],
    current: &[usize],
    future: &[usize],
    pairs: &[(u32, u32)],
    chip: &Chip,
) -> Option<(usize, usize)> {
    let mut best: Option<(f64, (usize, usize))> = None;

    for &g in current {
        let (a, b) = pairs[g];
        for p in [l2p[a as usize] as usize, l2p[b as usize] as usize] {
            for &q in chip.neighbors(p) {
                let mut trial = l2p.to_vec();
                if let Some(l) = p2l[p] {
                    trial[l as usize] = q as u32;
                }
                if let Some(l) = p2l[q] {
                    trial[l as usize] = p as u32;
                }
                let score = heuristic(&trial, current, future, pairs, chip);
                if best.map_or(true, |(lowest, _)| score < lowest) {
                    best = Some((score, (p, q)));
                }
            }
        }
    }

    best.map(|(_, pair)| pair)
}

/// Layer cost of a candidate layout: mean distance over the current layer
/// plus a discounted mean over the lookahead window.
fn heuristic(
    l2p: &[u32],
    current: &[usize],
    future: &[usize],
    pairs: &[(u32, u32)],
    chip: &Chip,
) -> f64 {
    if current.is_empty() {
        return 0.0;
    }

    let layer_cost = |layer: &[usize]| {
        let total: f64 = layer
            .iter()
            .map(|&g| {
                let (a, b) = pairs[g];
                f64::from(chip.distance(l2p[a as usize] as usize, l2p[b as usize] as usize))
            })
            .sum();
        total / layer.len() as f64
    };

    let mut cost = layer_cost(current);
    if !future.is_empty() {
        cost += FUTURE_WEIGHT * layer_cost(future);
    }
    cost
}

/// Retire executed gates, release their successors, and advance the layers.
fn maintain_layer(
    dag: &mut DepDag,
    current: &mut Vec<usize>,
    future: &mut Vec<usize>,
    ready: &[usize],
    gate_num: usize,
) {
    let mut next = Vec::with_capacity(current.len());

    for &g in current.iter() {
        // `ready` is drawn from `current` in ascending order.
        if ready.binary_search(&g).is_err() {
            next.push(g);
            continue;
        }
        dag.state[g] = NodeState::Executed;
        let released: Vec<usize> = dag.distinct_successors(g).collect();
        for s in released {
            if dag.deps[s] > 0 {
                dag.deps[s] -= 1;
            }
            if dag.deps[s] == 0 && dag.state[s] != NodeState::Current {
                dag.state[s] = NodeState::Current;
                next.push(s);
                future.retain(|&f| f != s);
            }
        }
    }

    next.sort_unstable();
    *current = next;
    refill_future(dag, current, future, gate_num);
}

/// Top the lookahead window back up: promote unseen gates within
/// `FUTURE_WINDOW` of the earliest current gate.
fn refill_future(dag: &mut DepDag, current: &[usize], future: &mut Vec<usize>, gate_num: usize) {
    let Some(&start) = current.first() else {
        return;
    };
    for g in start..(start + FUTURE_WINDOW).min(gate_num) {
        if dag.state[g] == NodeState::Unseen {
            dag.state[g] = NodeState::Future;
            future.push(g);
        }
    }
    future.sort_unstable();
}

fn map_single(gate: &Gate, l2p: &[u32]) -> Gate {
    let mut mapped = gate.clone();
    mapped.qubit = l2p[gate.qubit as usize];
    mapped
}

fn map_two(gate: &Gate, l2p: &[u32]) -> Gate {
    let mut mapped = gate.clone();
    mapped.qubit = l2p[gate.qubit as usize];
    mapped.ctrl = gate.ctrl.map(|c| l2p[c as usize]);
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs_of(circuit: &Circuit) -> Vec<(u32, u32)> {
        RoutingPlan::extract(circuit).pairs
    }

    #[test]
    fn test_dag_build() {
        // cx(0,1) cx(2,3) cx(1,2) cx(0,1)
        let pairs = vec![(0, 1), (2, 3), (1, 2), (0, 1)];
        let dag = DepDag::build(&pairs, 4);

        assert_eq!(dag.first_layer, vec![0, 1]);
        assert_eq!(dag.deps, vec![0, 0, 2, 2]);
        // gate 0 feeds gate 3 on qubit 0 (slot 0) and gate 2 on qubit 1 (slot 1)
        assert_eq!(dag.successors[0], [Some(3), Some(2)]);
        // gate 2 feeds gate 3 on qubit 1
        assert_eq!(dag.successors[2], [Some(3), None]);
        assert_eq!(dag.state[0], NodeState::Current);
        assert_eq!(dag.state[2], NodeState::Unseen);
    }

    #[test]
    fn test_dag_repeated_pair_releases_once() {
        let pairs = vec![(0, 1), (0, 1)];
        let dag = DepDag::build(&pairs, 2);
        assert_eq!(dag.deps, vec![0, 1]);
        assert_eq!(dag.successors[0], [Some(1), Some(1)]);
        assert_eq!(dag.distinct_successors(0).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_extract_plan() {
        let mut circuit = Circuit::new(3);
        circuit.h(0).unwrap();
        circuit.h(1).unwrap();
        circuit.cx(0, 1).unwrap();
        circuit.rz(0.5, 2).unwrap();
        circuit.cx(1, 2).unwrap();
        circuit.x(0).unwrap();

        let plan = RoutingPlan::extract(&circuit);
        assert_eq!(plan.pairs, vec![(0, 1), (1, 2)]);
        assert_eq!(plan.singles.len(), 3);
        // both h gates flush before cx(0,1), the rz before cx(1,2)
        assert_eq!(plan.pending[0], vec![0, 1]);
        assert_eq!(plan.pending[1], vec![2]);
        // the trailing x(0) has no later two-qubit gate
        assert_eq!(plan.leftover, vec![3]);
    }

    #[test]
    fn test_adjacent_cx_needs_no_swap() {
        let chip = Chip::linear(3);
        for seed in 0..8 {
            let mut circuit = Circuit::new(2);
            circuit.cx(0, 1).unwrap();
            SabreRouting::with_seed(seed).run(&mut circuit, &chip).unwrap();

            let swaps = circuit.count_op(Op::Swap);
            assert_eq!(swaps, 0, "seed {seed} produced {swaps} swaps");
            assert_eq!(circuit.num_gates(), 1);
            let g = &circuit.gates()[0];
            assert!(chip.is_adjacent(g.ctrl.unwrap() as usize, g.qubit as usize));
        }
    }

    #[test]
    fn test_singles_flush_before_their_gate() {
        let chip = Chip::linear(3);
        let mut circuit = Circuit::new(2);
        circuit.h(0).unwrap();
        circuit.cx(0, 1).unwrap();
        SabreRouting::with_seed(7).run(&mut circuit, &chip).unwrap();

        let ops: Vec<Op> = circuit.gates().iter().map(|g| g.op).collect();
        let h_pos = ops.iter().position(|&o| o == Op::H).unwrap();
        let cx_pos = ops.iter().position(|&o| o == Op::CX).unwrap();
        assert!(h_pos < cx_pos);
        // the h lands on the same physical qubit as the cx control
        let h = &circuit.gates()[h_pos];
        let cx = &circuit.gates()[cx_pos];
        assert_eq!(Some(h.qubit), cx.ctrl);
    }

    #[test]
    fn test_chip_too_small() {
        let chip = Chip::linear(2);
        let mut circuit = Circuit::new(3);
        circuit.cx(0, 2).unwrap();
        let err = SabreRouting::with_seed(0).run(&mut circuit, &chip).unwrap_err();
        assert!(matches!(err, CompileError::ChipTooSmall { n_qubits: 3, chip_qubit_num: 2 }));
    }

    #[test]
    fn test_disconnected_chip_is_unroutable() {
        let chip = Chip::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
        let mut circuit = Circuit::new(4);
        circuit.cx(0, 1).unwrap();
        circuit.cx(1, 2).unwrap();

        // Whatever the starting layout, one of the two gates must straddle
        // the cut between the components {0,1} and {2,3}: SWAPs cannot
        // cross it, so routing always fails.
        for seed in 0..8 {
            let mut c = circuit.clone();
            let err = SabreRouting::with_seed(seed).run(&mut c, &chip).unwrap_err();
            assert!(matches!(err, CompileError::Unroutable { .. }));
        }
    }

    #[test]
    fn test_empty_circuit() {
        let chip = Chip::linear(3);
        let mut circuit = Circuit::new(3);
        SabreRouting::with_seed(1).run(&mut circuit, &chip).unwrap();
        assert!(circuit.is_empty());

        let mut mapping = circuit.initial_mapping().to_vec();
        mapping.sort_unstable();
        assert_eq!(mapping, vec![0, 1, 2]);
    }

    #[test]
    fn test_plan_pairs_order() {
        let mut circuit = Circuit::new(4);
        circuit.cx(0, 1).unwrap();
        circuit.cx(2, 3).unwrap();
        circuit.cx(1, 2).unwrap();
        assert_eq!(pairs_of(&circuit), vec![(0, 1), (2, 3), (1, 2)]);
    }
}
