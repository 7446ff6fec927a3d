//! Distance graph of a simple temporal network and its closure.
//!
//! `d[i][j]` is the tightest known upper bound on `time(j) - time(i)`.
//! Closing the graph with Floyd–Warshall turns it into the minimal network:
//! every entry is then the tightest bound implied by the whole constraint
//! set, unless a negative cycle proves the network inconsistent.

use super::types::{DifferenceConstraint, NegativeCycle, StpSolution};
use crate::error::{CspError, InvalidProblem};
use log::{debug, trace};
use std::collections::HashMap;

const INF: f64 = f64::INFINITY;

/// Distance graph over named events.
///
/// # Examples
///
/// ```
/// use u_csp::stp::{DifferenceConstraint, DistanceGraph};
///
/// let constraints = [
///     DifferenceConstraint::new("start", "end", 10.0),
///     DifferenceConstraint::new("end", "start", -4.0),
/// ];
/// let mut graph = DistanceGraph::new(&["start", "end"], &constraints).unwrap();
/// graph.close().unwrap();
/// assert_eq!(graph.bounds("start", "end").unwrap(), (4.0, 10.0));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceGraph {
    events: Vec<String>,
    index: HashMap<String, usize>,
    dist: Vec<Vec<f64>>,
    /// Intermediate event of the tightest path found so far.
    via: Vec<Vec<Option<usize>>>,
    /// Most negative `e -> e` constraint, if any.
    self_loop: Option<(usize, f64)>,
    closed: bool,
    cycle: Option<NegativeCycle>,
}

impl DistanceGraph {
    /// Builds the graph, keeping the tightest bound per ordered pair.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem`] for duplicate or unknown events and non-finite
    /// weights.
    pub fn new<S: AsRef<str>>(
        events: &[S],
        constraints: &[DifferenceConstraint],
    ) -> Result<Self, CspError> {
        let n = events.len();
        let mut names = Vec::with_capacity(n);
        let mut index = HashMap::with_capacity(n);
        for event in events {
            let name = event.as_ref().to_string();
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(InvalidProblem::DuplicateEvent(name).into());
            }
            names.push(name);
        }

        let mut dist = vec![vec![INF; n]; n];
        for (i, row) in dist.iter_mut().enumerate() {
            row[i] = 0.0;
        }

        let mut self_loop: Option<(usize, f64)> = None;
        for c in constraints {
            let lookup = |name: &str| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| InvalidProblem::UnknownEvent(name.to_string()))
            };
            let i = lookup(&c.from)?;
            let j = lookup(&c.to)?;
            if !c.weight.is_finite() {
                return Err(InvalidProblem::InvalidWeight {
                    from: c.from.clone(),
                    to: c.to.clone(),
                }
                .into());
            }
            if i == j {
                if c.weight < 0.0 && self_loop.is_none_or(|(_, w)| c.weight < w) {
                    self_loop = Some((i, c.weight));
                }
            } else if c.weight < dist[i][j] {
                dist[i][j] = c.weight;
            }
        }

        Ok(Self {
            events: names,
            index,
            dist,
            via: vec![vec![None; n]; n],
            self_loop,
            closed: false,
            cycle: None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event names in input order.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Whether [`close`](Self::close) has completed on a consistent network.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The witness found by a failed [`close`](Self::close).
    pub fn negative_cycle(&self) -> Option<&NegativeCycle> {
        self.cycle.as_ref()
    }

    /// Computes all-pairs tightest bounds.
    ///
    /// Stops at the first negative cycle; the matrix is then left partially
    /// relaxed. Calling again returns the cached outcome.
    ///
    /// # Errors
    ///
    /// The [`NegativeCycle`] proving the network inconsistent.
    pub fn close(&mut self) -> Result<(), NegativeCycle> {
        if let Some(cycle) = &self.cycle {
            return Err(cycle.clone());
        }
        if self.closed {
            return Ok(());
        }
        if let Some((e, weight)) = self.self_loop {
            let name = self.events[e].clone();
            return Err(self.fail(NegativeCycle {
                events: vec![name.clone(), name],
                total_weight: weight,
            }));
        }

        let n = self.len();
        for k in 0..n {
            for i in 0..n {
                let dik = self.dist[i][k];
                if dik == INF {
                    continue;
                }
                for j in 0..n {
                    let dkj = self.dist[k][j];
                    if dkj == INF {
                        continue;
                    }
                    let candidate = dik + dkj;
                    if candidate < self.dist[i][j] {
                        if i == j {
                            let cycle = self.witness(i, k, candidate);
                            return Err(self.fail(cycle));
                        }
                        trace!(
                            "{} -> {} tightened to {} via {}",
                            self.events[i],
                            self.events[j],
                            candidate,
                            self.events[k]
                        );
                        self.dist[i][j] = candidate;
                        self.via[i][j] = Some(k);
                    }
                }
            }
        }

        self.closed = true;
        debug!("closed distance graph over {} events", n);
        Ok(())
    }

    fn fail(&mut self, cycle: NegativeCycle) -> NegativeCycle {
        debug!(
            "negative cycle {:?} with total weight {}",
            cycle.events, cycle.total_weight
        );
        self.cycle = Some(cycle.clone());
        cycle
    }

    /// Closed walk `i -> k -> i` of weight `d[i][k] + d[k][i]`.
    fn witness(&self, i: usize, k: usize, total_weight: f64) -> NegativeCycle {
        let mut walk = self.walk(i, k);
        walk.extend(self.walk(k, i).into_iter().skip(1));
        NegativeCycle {
            events: walk.into_iter().map(|e| self.events[e].clone()).collect(),
            total_weight,
        }
    }

    /// Expands `from -> to` into input edges through the intermediates.
    fn walk(&self, from: usize, to: usize) -> Vec<usize> {
        let mut out = vec![from];
        let mut pending = vec![(from, to)];
        while let Some((a, b)) = pending.pop() {
            match self.via[a][b] {
                Some(m) => {
                    pending.push((m, b));
                    pending.push((a, m));
                }
                None if a != b => out.push(b),
                None => {}
            }
        }
        out
    }

    fn lookup(&self, event: &str) -> Result<usize, CspError> {
        self.index
            .get(event)
            .copied()
            .ok_or_else(|| InvalidProblem::UnknownEvent(event.to_string()).into())
    }

    /// Upper bound on `time(to) - time(from)`, `None` when unbounded.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem::UnknownEvent`] for an unknown name.
    pub fn distance(&self, from: &str, to: &str) -> Result<Option<f64>, CspError> {
        let d = self.dist[self.lookup(from)?][self.lookup(to)?];
        Ok((d < INF).then_some(d))
    }

    /// `(lower, upper)` bounds on `time(to) - time(from)`, infinite when
    /// unbounded. Tightest once the graph is closed.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem::UnknownEvent`] for an unknown name.
    pub fn bounds(&self, from: &str, to: &str) -> Result<(f64, f64), CspError> {
        let i = self.lookup(from)?;
        let j = self.lookup(to)?;
        Ok((-self.dist[j][i], self.dist[i][j]))
    }

    /// Events along the tightest `from -> to` path, `None` when unbounded.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem::UnknownEvent`] for an unknown name.
    pub fn path(&self, from: &str, to: &str) -> Result<Option<Vec<String>>, CspError> {
        let i = self.lookup(from)?;
        let j = self.lookup(to)?;
        if self.dist[i][j] == INF {
            return Ok(None);
        }
        Ok(Some(
            self.walk(i, j)
                .into_iter()
                .map(|e| self.events[e].clone())
                .collect(),
        ))
    }

    /// Closes the graph and schedules events relative to the first one.
    pub fn solve(&mut self) -> StpSolution {
        if self.is_empty() {
            return StpSolution::consistent(Vec::new());
        }
        self.solve_at(0)
    }

    /// Closes the graph and schedules events relative to `reference`.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem::UnknownEvent`] for an unknown reference.
    pub fn solve_with_reference(&mut self, reference: &str) -> Result<StpSolution, CspError> {
        let r = self.lookup(reference)?;
        Ok(self.solve_at(r))
    }

    fn solve_at(&mut self, r: usize) -> StpSolution {
        if let Err(cycle) = self.close() {
            return StpSolution::inconsistent(cycle);
        }

        let n = self.len();
        let mut time: Vec<Option<f64>> = vec![None; n];
        time[r] = Some(0.0);
        for e in 0..n {
            if e != r && self.dist[e][r] < INF {
                time[e] = Some(0.0 - self.dist[e][r]);
            }
        }

        // Remaining events are placed one at a time inside the window left
        // by those already fixed; a closed network never leaves it empty.
        for e in 0..n {
            if time[e].is_some() {
                continue;
            }
            let mut lower = f64::NEG_INFINITY;
            let mut upper = INF;
            for (f, tf) in time.iter().enumerate() {
                let Some(tf) = *tf else { continue };
                if self.dist[e][f] < INF {
                    lower = lower.max(tf - self.dist[e][f]);
                }
                if self.dist[f][e] < INF {
                    upper = upper.min(tf + self.dist[f][e]);
                }
            }
            time[e] = Some(if lower.is_finite() {
                lower
            } else if upper.is_finite() {
                upper
            } else {
                0.0
            });
        }

        let offsets = self
            .events
            .iter()
            .cloned()
            .zip(time.into_iter().map(|t| t.unwrap_or(0.0)))
            .collect();
        StpSolution::consistent(offsets)
    }
}
