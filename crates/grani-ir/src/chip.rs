//! Target device model: coupling graph and distances.

use serde::Deserialize;

use crate::error::{IrError, IrResult};

/// Distance sentinel for disconnected qubit pairs.
pub const UNREACHABLE: u32 = u32::MAX;

/// An immutable device descriptor.
///
/// Holds the undirected coupling graph three ways: a symmetric 0/1 adjacency
/// matrix, per-qubit neighbor lists (in insertion order, which fixes the
/// router's tie-breaking), and an all-pairs hop-count matrix computed once
/// with Floyd-Warshall. Disconnected pairs read [`UNREACHABLE`].
#[derive(Debug, Clone)]
pub struct Chip {
    chip_qubit_num: usize,
    adj_mat: Vec<Vec<u8>>,
    edge_list: Vec<Vec<usize>>,
    distance_mat: Vec<Vec<u32>>,
}

/// On-disk backend description.
///
/// `cx_coupling` entries are `"A_B"` strings naming a directed coupling;
/// the induced graph is treated as undirected.
#[derive(Debug, Deserialize)]
struct DeviceConfig {
    num_qubits: usize,
    cx_coupling: Vec<String>,
}

impl Chip {
    /// Build a chip from an undirected edge list.
    ///
    /// Self-loops and duplicate edges (in either direction) are ignored.
    pub fn from_edges(num_qubits: usize, edges: &[(usize, usize)]) -> IrResult<Self> {
        let mut adj_mat = vec![vec![0u8; num_qubits]; num_qubits];
        for &(a, b) in edges {
            for q in [a, b] {
                if q >= num_qubits {
                    return Err(IrError::EdgeOutOfRange {
                        qubit: q,
                        num_qubits,
                    });
                }
            }
            if a != b {
                adj_mat[a][b] = 1;
                adj_mat[b][a] = 1;
            }
        }

        let edge_list = adj_mat
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &bit)| bit == 1)
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect();

        let distance_mat = floyd(num_qubits, &adj_mat);

        Ok(Self {
            chip_qubit_num: num_qubits,
            adj_mat,
            edge_list,
            distance_mat,
        })
    }

    /// Parse a backend JSON config.
    ///
    /// With `limit` set (the `-limited` option), couplings touching a qubit
    /// at or beyond the limit are dropped and the device is shrunk to the
    /// limit, so routing stays within the circuit's own qubit range.
    pub fn from_device_json(source: &str, limit: Option<usize>) -> IrResult<Self> {
        let config: DeviceConfig = serde_json::from_str(source)?;
        if config.num_qubits == 0 {
            return Err(IrError::InvalidDeviceConfig(
                "device declares zero qubits".into(),
            ));
        }

        let num_qubits = match limit {
            Some(n) => n.min(config.num_qubits),
            None => config.num_qubits,
        };

        let mut edges = Vec::with_capacity(config.cx_coupling.len());
        for entry in &config.cx_coupling {
            let (first, second) = entry.split_once('_').ok_or_else(|| {
                IrError::InvalidDeviceConfig(format!("malformed coupling entry '{entry}'"))
            })?;
            let a: usize = first.parse().map_err(|_| {
                IrError::InvalidDeviceConfig(format!("malformed coupling entry '{entry}'"))
            })?;
            let b: usize = second.parse().map_err(|_| {
                IrError::InvalidDeviceConfig(format!("malformed coupling entry '{entry}'"))
            })?;
            if limit.is_some() && (a >= num_qubits || b >= num_qubits) {
                continue;
            }
            edges.push((a, b));
        }

        Self::from_edges(num_qubits, &edges)
    }

    /// Create a linear chain 0-1-2-...
    pub fn linear(n: usize) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self::from_edges(n, &edges).expect("linear edges in range")
    }

    /// Create a star topology (qubit 0 connected to all others).
    pub fn star(n: usize) -> Self {
        let edges: Vec<_> = (1..n).map(|i| (0, i)).collect();
        Self::from_edges(n, &edges).expect("star edges in range")
    }

    /// Create a fully connected topology.
    pub fn full(n: usize) -> Self {
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self::from_edges(n, &edges).expect("full edges in range")
    }

    /// Number of physical qubits on the device.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.chip_qubit_num
    }

    /// Shortest-path hop count between two physical qubits.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> u32 {
        self.distance_mat[a][b]
    }

    /// Whether two physical qubits share a coupling.
    #[inline]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.adj_mat[a][b] == 1
    }

    /// Neighbors of a physical qubit, in index order.
    #[inline]
    pub fn neighbors(&self, qubit: usize) -> &[usize] {
        &self.edge_list[qubit]
    }

    /// The symmetric 0/1 adjacency matrix.
    pub fn adjacency(&self) -> &[Vec<u8>] {
        &self.adj_mat
    }
}

/// All-pairs shortest paths over a 0/1 adjacency matrix.
fn floyd(n: usize, adj_mat: &[Vec<u8>]) -> Vec<Vec<u32>> {
    let mut dist = vec![vec![UNREACHABLE; n]; n];
    for i in 0..n {
        for j in 0..n {
            if adj_mat[i][j] != 0 {
                dist[i][j] = 1;
            }
        }
        dist[i][i] = 0;
    }
    for k in 0..n {
        for i in 0..n {
            if dist[i][k] == UNREACHABLE {
                continue;
            }
            for j in 0..n {
                if dist[k][j] == UNREACHABLE {
                    continue;
                }
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_distances() {
        let chip = Chip::linear(5);
        assert!(chip.is_adjacent(0, 1));
        assert!(chip.is_adjacent(1, 2));
        assert!(!chip.is_adjacent(0, 2));
        assert_eq!(chip.distance(0, 4), 4);
        assert_eq!(chip.distance(2, 2), 0);
        assert_eq!(chip.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_star_distances() {
        let chip = Chip::star(5);
        assert!(chip.is_adjacent(0, 4));
        assert!(!chip.is_adjacent(1, 2));
        assert_eq!(chip.distance(1, 2), 2);
    }

    #[test]
    fn test_distance_matrix_invariants() {
        let chip = Chip::star(6);
        let n = chip.num_qubits();
        for i in 0..n {
            assert_eq!(chip.distance(i, i), 0);
            for j in 0..n {
                assert_eq!(chip.distance(i, j), chip.distance(j, i));
                for k in 0..n {
                    // triangle inequality
                    assert!(chip.distance(i, j) <= chip.distance(i, k) + chip.distance(k, j));
                }
            }
        }
    }

    #[test]
    fn test_disconnected_pair() {
        let chip = Chip::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
        assert_eq!(chip.distance(0, 1), 1);
        assert_eq!(chip.distance(1, 2), UNREACHABLE);
    }

    #[test]
    fn test_from_device_json() {
        let source = r#"{
            "num_qubits": 4,
            "cx_coupling": ["0_1", "1_0", "1_2", "2_3"]
        }"#;

        let chip = Chip::from_device_json(source, None).unwrap();
        assert_eq!(chip.num_qubits(), 4);
        assert!(chip.is_adjacent(0, 1));
        assert!(chip.is_adjacent(3, 2));
        assert_eq!(chip.distance(0, 3), 3);
    }

    #[test]
    fn test_from_device_json_limited() {
        let source = r#"{
            "num_qubits": 4,
            "cx_coupling": ["0_1", "1_2", "2_3"]
        }"#;

        let chip = Chip::from_device_json(source, Some(2)).unwrap();
        assert_eq!(chip.num_qubits(), 2);
        assert!(chip.is_adjacent(0, 1));
    }

    #[test]
    fn test_bad_config() {
        assert!(Chip::from_device_json("{", None).is_err());
        let source = r#"{"num_qubits": 2, "cx_coupling": ["0-1"]}"#;
        assert!(matches!(
            Chip::from_device_json(source, None),
            Err(IrError::InvalidDeviceConfig(_))
        ));
        assert!(matches!(
            Chip::from_edges(2, &[(0, 5)]),
            Err(IrError::EdgeOutOfRange { qubit: 5, .. })
        ));
    }
}
