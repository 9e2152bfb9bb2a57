pub mod daemon;
pub mod service;

#[cfg(test)]
mod test_server;
