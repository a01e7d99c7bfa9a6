pub mod diff;
pub mod monitoring;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;
