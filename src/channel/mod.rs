// Live channel: frame codec, inbound feed and outbound command queue

pub mod feed;
pub mod protocol;

pub use feed::{command_channel, run_feed, write_commands, CommandSender, FeedSummary};
pub use protocol::{apply, decode, encode, ClientMessage, ProtocolError, ServerMessage};

#[cfg(test)]
mod tests;
