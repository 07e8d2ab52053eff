use pleco::BitMove;
use treebot::node_table::{NodeTable, MAX_EDGES};

#[test]
fn capacity_rounds_up_to_power_of_two() {
    assert_eq!(NodeTable::new(16).capacity(), 16);
    assert_eq!(NodeTable::new(10).capacity(), 16);
    assert_eq!(NodeTable::new(1).capacity(), 1);
}

#[test]
fn slot_persists_until_a_collision_replaces_it() {
    let mut t = NodeTable::new(16);
    let h = t.lookup(5, 7);
    t.node_mut(h).visits = 3;

    // Same identity finds the same statistics
    let h2 = t.lookup(5, 7);
    assert_eq!(h, h2);
    assert_eq!(t.node(h2).visits, 3);

    // 21 & 15 == 5: lands on the same slot, replaces it
    let h3 = t.lookup(21, 9);
    assert_eq!(t.node(h3).visits, 0);
    assert_eq!(t.node(h3).key1, 21);
    assert_eq!(t.node(h3).key2, 9);

    // The original position now gets a fresh node
    let h4 = t.lookup(5, 7);
    assert_eq!(t.node(h4).visits, 0);
}

#[test]
fn pawn_key_disambiguates_same_slot() {
    let mut t = NodeTable::new(16);
    let h = t.lookup(5, 7);
    t.node_mut(h).visits = 3;

    // Same primary key, different pawn key: treated as a different position
    let h2 = t.lookup(5, 8);
    assert_eq!(t.node(h2).visits, 0);
}

#[test]
fn edge_list_is_capped() {
    let mut t = NodeTable::new(4);
    let h = t.lookup(1, 1);
    for _ in 0..200 {
        t.node_mut(h).add_edge(BitMove::null(), 0.1);
    }
    assert_eq!(t.node(h).edges.len(), MAX_EDGES);
    assert_eq!(t.node(h).sons as usize, MAX_EDGES);
}

#[test]
fn edges_sort_descending_by_prior() {
    let mut t = NodeTable::new(4);
    let h = t.lookup(1, 1);
    for p in [0.2, 0.9, 0.5] {
        t.node_mut(h).add_edge(BitMove::null(), p);
    }
    t.node_mut(h).sort_edges_by_prior();
    let priors: Vec<f64> = t.node(h).edges.iter().map(|e| e.prior).collect();
    assert_eq!(priors, vec![0.9, 0.5, 0.2]);
}
