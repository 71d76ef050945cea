use crate::utils::Result;
use log::debug;
use std::path::Path;

pub const EULA_ACCEPTED: &str = "eula=true";

/// Writes `eula.txt` accepting the Minecraft EULA, replacing any existing file.
///
/// The content goes to a temporary sibling first and is renamed into place,
/// so the server never sees a half-written file.
pub async fn accept_eula(path: &Path) -> Result<()> {
    let tmp = path.with_extension("txt.tmp");
    debug!("Writing {path:?}");

    if let Err(e) = tokio::fs::write(&tmp, EULA_ACCEPTED).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_dir;
    use crate::utils::Error;

    #[tokio::test]
    async fn overwrites_with_exact_content() {
        let dir = temp_dir().await;
        let path = dir.join("eula.txt");
        tokio::fs::write(&path, "eula=false\n").await.unwrap();

        accept_eula(&path).await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"eula=true");
        assert!(!dir.join("eula.txt.tmp").exists());
    }

    #[tokio::test]
    async fn missing_directory_is_io_error() {
        let dir = temp_dir().await;
        let err = accept_eula(&dir.join("nope").join("eula.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
