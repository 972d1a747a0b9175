//! Agent roles and the single-invocation wrapper.

pub mod invoker;
pub mod prompt;
pub mod roles;
pub mod tools;

pub use invoker::AgentInvoker;
pub use prompt::InputBuilder;
pub use roles::RoleRegistry;
pub use tools::ToolBinding;
