// control: read side (registry, selectors, listing)
// data: side-effecting batch operations and the enabled-map write boundary
pub mod control;
pub mod data;
