use std::fs;
use std::io;
use std::path::Path;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// 读取整个文件，文件不存在时返回None
pub fn read_file_if_exists(file_path: impl AsRef<Path>) -> io::Result<Option<String>> {
    match fs::read_to_string(file_path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// RFC 3339格式的当前UTC时间
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}
