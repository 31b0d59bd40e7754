/// Candidate file names for the native Vulkan driver library, in probe order.
/// The replayer loads the driver by its well-known name only; it never takes
/// a library path from the trace.
pub fn vulkan_library_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["vulkan-1.dll"]
    }
    #[cfg(target_os = "macos")]
    {
        &["libvulkan.dylib", "libvulkan.1.dylib"]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        &["libvulkan.so.1", "libvulkan.so"]
    }
}

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "windows")]
    { "windows" }
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "macos")]
    { "macos" }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    { "unknown" }
}
