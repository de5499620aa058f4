//! # mig-rs: Majority-Inverter Graphs and node-local resynthesis in Rust
//!
//! **`mig-rs`** is a small logic-optimization library built around **Majority-Inverter Graphs (MIGs)**:
//! Boolean circuits made of 3-input majority gates with complemented edges.
//! It provides the network itself, windowing, truth-table simulation, and a refactoring pass
//! that replaces local sub-circuits with smaller, functionally equivalent ones.
//!
//! ## What is an MIG?
//!
//! The majority function `<a b c>` is true when at least two of its inputs are true.
//! Together with inversion it is functionally complete: `a & b = <0 a b>` and `a | b = <1 a b>`.
//! An MIG is a DAG whose internal nodes are majority gates and whose edges may be complemented.
//!
//! ## Key Features
//!
//! - **Hash-Consing**: [`Mig`][crate::mig::Mig] normalizes every gate (fan-in order, trivial cases, self-duality)
//!   and looks it up in a unique table, so structurally equal gates are created only once.
//! - **Lightweight Handles**: nodes are plain ids ([`Node`][crate::types::Node]) and edges are
//!   [`Signal`][crate::signal::Signal]s (node + complement bit), both `Copy`.
//! - **Generic Algorithms**: simulation, cuts, MFFC, and refactoring are written against the
//!   [`Network`][crate::network::Network] / [`NetworkMut`][crate::network::NetworkMut] traits.
//! - **Portable Replacements**: circuits found by resynthesis are [`IndexList`][crate::index_list::IndexList]s,
//!   which can be serialized, simulated, and replayed into any network.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mig_rs::mig::Mig;
//! use mig_rs::network::{Network, NetworkMut};
//! use mig_rs::refactor::{refactor, RefactorParams};
//! use mig_rs::simulation::simulate;
//!
//! // 1. Build a network: f = a & (b & a)
//! let mut mig = Mig::new();
//! let a = mig.create_pi();
//! let b = mig.create_pi();
//! let g = mig.create_and(b, a);
//! let f = mig.create_and(a, g);
//! mig.create_po(f);
//! let before = simulate(&mig);
//!
//! // 2. Optimize it in place
//! let stats = refactor(&mut mig, &RefactorParams::default());
//!
//! // 3. The function is preserved, the redundant gate is gone
//! assert_eq!(simulate(&mig), before);
//! assert_eq!(mig.num_gates(), 1);
//! assert_eq!(stats.num_replacements, 1);
//! ```
//!
//! ## Core Components
//!
//! - **[`mig`]**: The concrete network, with structural hashing and in-place substitution.
//! - **[`views`]**: Read-only views, most notably the cone-of-influence view.
//! - **[`resyn`]**: The enumerative majority resynthesis engine.
//! - **[`refactor`]**: The driver that sweeps a network and splices in smaller circuits.
//! - **[`window_resub`]**: Resubstitution over windows that also offer existing gates as divisors.
//! - **[`cleanup`]**: Compaction of a network after rewriting.

pub mod cleanup;
pub mod cut;
pub mod index_list;
pub mod mffc;
pub mod mig;
pub mod network;
pub mod node;
pub mod refactor;
pub mod resyn;
pub mod signal;
pub mod simulation;
pub mod table;
pub mod truth_table;
pub mod types;
pub mod utils;
pub mod views;
pub mod window_resub;
