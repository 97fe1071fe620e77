pub mod local_deployer;
pub mod mock_deployer;
pub mod port_allocator;
