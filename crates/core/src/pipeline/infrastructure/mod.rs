pub(crate) mod pipeline_worker;
pub mod proc_meminfo_monitor;
