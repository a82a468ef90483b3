//! The privileged side of the app: owns persistence, the clipboard and
//! notifications, and talks to UI windows only through channels.

pub mod bridge;
pub mod messages;
pub mod platform;
pub mod service;

pub use bridge::{HostBridge, HostLink, HostPlatform, PlatformApi};
pub use messages::{HostEvent, HostRequest, WindowId};
pub use platform::{ClipboardSource, DesktopNotifier, Notifier, StaticClipboard, SystemClipboard};
pub use service::{HostHandle, HostService};
