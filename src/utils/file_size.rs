pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Size in megabytes with two decimals, the way the selection card shows it.
    pub fn format_size(size: u64) -> String {
        let megabytes = size as f64 / 1024.0 / 1024.0;
        format!("{:.2} MB", megabytes)
    }
}
