//! Blocking HTTP client shared by all fetchers

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::UfetchError;
use crate::fetch::Service;
use crate::utils::terminal::{create_download_bar, format_size, print_verbose};

/// HTTP client with a fixed User-Agent
pub struct HttpClient {
    client: Client,
    verbose: bool,
}

impl HttpClient {
    /// Build a client sending `user_agent` with every request.
    ///
    /// No request timeout is set; large archives stream for as long as they need.
    pub fn new(user_agent: &str, system_proxy: bool, verbose: bool) -> Result<Self, UfetchError> {
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .timeout(None::<Duration>);
        if !system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| {
                UfetchError::config_error(
                    format!("failed to create HTTP client: {}", e),
                    None,
                    Some("Check the user_agent setting".to_string()),
                )
            })?;

        Ok(Self { client, verbose })
    }

    /// GET `url`, failing on transport errors and non-success statuses
    fn get(&self, service: Service, identifier: &str, url: &str) -> Result<Response, UfetchError> {
        print_verbose(self.verbose, &format!("GET {}", url));

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| UfetchError::http_transport(service, identifier, url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UfetchError::http_status(service, identifier, url, status.as_u16()));
        }

        Ok(response)
    }

    /// GET `url` and decode the body as JSON
    pub fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        identifier: &str,
        url: &str,
    ) -> Result<T, UfetchError> {
        let body = self
            .get(service, identifier, url)?
            .bytes()
            .map_err(|e| UfetchError::http_transport(service, identifier, url, e))?;

        serde_json::from_slice(&body).map_err(|e| {
            UfetchError::malformed(service, identifier, format!("invalid JSON from {}: {}", url, e))
        })
    }

    /// Stream `url` into `dest`, returning the number of bytes written.
    ///
    /// A partially written file is removed when the transfer fails.
    pub fn download(
        &self,
        service: Service,
        identifier: &str,
        url: &str,
        dest: &Path,
    ) -> Result<u64, UfetchError> {
        println!("Downloading: {}", url);

        let mut response = self.get(service, identifier, url)?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| UfetchError::io(parent, "Failed to create directory", e))?;
        }

        let file =
            File::create(dest).map_err(|e| UfetchError::io(dest, "Failed to create file", e))?;
        let mut writer = BufWriter::new(file);

        let pb = create_download_bar(response.content_length(), "Downloading");
        let copied = copy_body(&mut pb.wrap_read(&mut response), &mut writer);
        pb.finish_and_clear();

        let written = match copied {
            Ok(n) => n,
            Err(e) => {
                drop(writer);
                let _ = std::fs::remove_file(dest);
                return Err(match e {
                    CopyError::Read(e) => UfetchError::Http {
                        service,
                        identifier: identifier.to_string(),
                        url: url.to_string(),
                        message: format!("transfer interrupted: {}", e),
                        status: None,
                        source: None,
                    },
                    CopyError::Write(e) => UfetchError::io(dest, "Failed to write file", e),
                });
            }
        };

        println!("Saved to {}", dest.display());
        print_verbose(self.verbose, &format_size(written));
        Ok(written)
    }
}

/// Which side of a body copy failed
#[derive(Debug)]
enum CopyError {
    Read(std::io::Error),
    Write(std::io::Error),
}

/// Like `std::io::copy`, but keeps network and disk failures apart
fn copy_body(reader: &mut impl Read, writer: &mut impl Write) -> Result<u64, CopyError> {
    let mut buf = [0u8; 64 * 1024];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        written += n as u64;
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::ConnectionReset, "reset by peer"))
        }
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_copy_body_counts_bytes() {
        let body = vec![7u8; 200_000];
        let mut out = Vec::new();

        let n = copy_body(&mut Cursor::new(body.clone()), &mut out).unwrap();

        assert_eq!(n, body.len() as u64);
        assert_eq!(out, body);
    }

    #[test]
    fn test_copy_body_read_failure() {
        let err = copy_body(&mut FailingReader, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CopyError::Read(_)));
    }

    #[test]
    fn test_copy_body_write_failure() {
        let err = copy_body(&mut Cursor::new(b"payload".to_vec()), &mut FullDisk).unwrap_err();
        assert!(matches!(err, CopyError::Write(_)));
    }

    #[test]
    fn test_download_write_failure_is_io_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/big.tgz")
            .with_status(200)
            .with_body(vec![1u8; 1024])
            .create();
        let temp_dir = tempfile::TempDir::new().unwrap();
        // A directory in the way of the target file
        let dest = temp_dir.path().join("big.tgz");
        std::fs::create_dir(&dest).unwrap();

        let client = HttpClient::new("ufetch-test/1.0", false, false).unwrap();
        let err = client
            .download(Service::Npm, "big", &format!("{}/big.tgz", server.url()), &dest)
            .unwrap_err();

        assert!(matches!(err, UfetchError::Io { .. }), "{:?}", err);
    }
}
