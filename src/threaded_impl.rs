pub mod control_thread;

pub use control_thread::spawn_control_loop;
