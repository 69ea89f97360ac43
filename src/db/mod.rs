//! Database layer (Firestore, or in-memory for local runs).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const RECOMMENDATIONS: &str = "recommendations";
}
