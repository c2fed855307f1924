pub mod alias;
pub mod association_select;
pub mod eager_graph;
pub mod inheritance;
pub mod join_util;
pub mod limit_strategy;

#[cfg(test)]
pub mod test_util;
