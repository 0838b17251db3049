use capstan_core::plugin_system::error::RejectionReason;
use capstan_core::plugin_system::graph::{Resolution, ResolutionSink};
use capstan_core::plugin_system::node::PluginNode;

/// Resolution sink for the command-line interface.
///
/// Streams rejection events to standard output as they land and announces
/// the accepted set once the batch is done.
pub struct ConsoleSink;

impl ResolutionSink for ConsoleSink {
    fn plugin_rejected(&mut self, plugin_id: &str, reason: &RejectionReason) {
        println!("rejected  {plugin_id}: {reason}");
    }

    fn plugin_accepted(&mut self, node: &PluginNode) {
        match node.declared_version() {
            Some(version) => println!("accepted  {} v{}", node.id(), version),
            None => println!("accepted  {}", node.id()),
        }
    }

    fn batch_complete(&mut self, accepted_count: usize) {
        println!("resolution complete: {accepted_count} plugin(s) accepted");
    }
}

/// Prints a one-line summary after a resolution run.
pub fn print_summary(resolution: &Resolution) {
    println!(
        "{} accepted, {} rejected",
        resolution.accepted.len(),
        resolution.rejected.len()
    );
}
