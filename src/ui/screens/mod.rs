pub(crate) mod allocation;
pub(crate) mod insights;
