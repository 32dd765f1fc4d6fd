//! 출력 스트림 핸들
//!
//! 수집 루프(파싱 경고)와 스케줄러(주기 리포트)가 같은 출력 스트림에 씁니다.
//! [`ReportSink`]는 호출자의 `AsyncWrite`를 비동기 뮤텍스로 감싸
//! 한 리포트가 항상 온전한 한 줄로 기록되도록 합니다.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

use httplog_core::metrics as m;

use crate::error::MonitorError;
use crate::report::Report;

type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// 리포트 출력 핸들
///
/// 복제해도 같은 출력 스트림을 가리킵니다.
#[derive(Clone)]
pub struct ReportSink {
    writer: Arc<Mutex<BoxedWriter>>,
}

impl ReportSink {
    /// 출력 스트림을 감싸는 새 핸들을 생성합니다.
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::pin(writer))),
        }
    }

    /// 리포트 한 줄을 기록하고 즉시 flush합니다.
    ///
    /// 쓰기와 flush는 같은 락 구간에서 수행되므로 다른 리포트와 섞이지 않습니다.
    pub async fn emit(&self, report: &Report) -> Result<(), MonitorError> {
        let line = format!("{report}\n");
        {
            let mut writer = self.writer.lock().await;
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }

        metrics::counter!(m::MONITOR_REPORTS_EMITTED_TOTAL, m::LABEL_REPORT => report.kind())
            .increment(1);
        debug!(kind = report.kind(), "report emitted");
        Ok(())
    }

    /// 버퍼에 남은 출력을 flush합니다.
    pub async fn flush(&self) -> Result<(), MonitorError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

impl fmt::Debug for ReportSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn emit_writes_one_line_per_report() {
        let (writer, mut reader) = tokio::io::duplex(1024);
        let sink = ReportSink::new(writer);

        sink.emit(&Report::NoHits).await.unwrap();
        sink.emit(&Report::MalformedLine {
            message: "bad".to_owned(),
        })
        .await
        .unwrap();
        drop(sink);

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        assert_eq!(output, "no hits to server\nWARNING: bad\n");
    }

    #[tokio::test]
    async fn clones_share_the_same_stream() {
        let (writer, mut reader) = tokio::io::duplex(1024);
        let sink = ReportSink::new(writer);
        let other = sink.clone();

        sink.emit(&Report::NoHits).await.unwrap();
        other.emit(&Report::NoHits).await.unwrap();
        other.flush().await.unwrap();
        drop(sink);
        drop(other);

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[tokio::test]
    async fn emit_fails_when_reader_is_gone() {
        let (writer, reader) = tokio::io::duplex(64);
        drop(reader);
        let sink = ReportSink::new(writer);

        let err = sink.emit(&Report::NoHits).await.unwrap_err();
        assert!(matches!(err, MonitorError::Io(_)));
    }
}
