pub mod branch_track;
pub mod cleanup;
pub mod depth_map;
pub mod edit;
pub mod model;
pub mod plan;
pub mod reconcile;
pub mod resolve;
pub mod rewrite;


#[cfg(test)]
mod depth_map_test;



#[cfg(test)]
mod resolve_test;
