// ==========================================
// 学员名册导入系统 - 批量提交器
// ==========================================
// 职责: 整批提交 + 服务端结果与本地结果合并
// 红线: 每次确认只发起一次请求；失败不重试，不产生部分成功
// ==========================================

use crate::domain::roster::{CandidateRecord, ErrorOrigin, ReportedError, RowError, UploadResult};
use crate::uploader::client::{BatchUploadClient, ServerBatchResponse};
use crate::uploader::error::UploadError;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

pub struct UploadSubmitter<C: BatchUploadClient> {
    client: C,
}

impl<C: BatchUploadClient> UploadSubmitter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 提交全部待提交记录
    ///
    /// # 参数
    /// - ready_records: 已通过校验的记录（原始行序）
    /// - client_errors: 本地校验产生的阻断错误（排在结果错误列表前部）
    ///
    /// # 返回
    /// - Ok(UploadResult): 合并后的提交结果
    /// - Err(UploadError): 整批失败
    #[instrument(skip_all, fields(count = ready_records.len()))]
    pub async fn submit(
        &self,
        ready_records: &[CandidateRecord],
        client_errors: &[RowError],
    ) -> Result<UploadResult, UploadError> {
        if ready_records.is_empty() {
            warn!("待提交列表为空，未发起请求");
            return Err(UploadError::NothingToSubmit);
        }

        let start_time = Instant::now();
        let response = self.client.upload_batch(ready_records).await.map_err(|e| {
            error!(error = %e, "批量提交失败");
            e
        })?;

        let result = reconcile(ready_records.len(), client_errors, response);

        info!(
            submitted = result.submitted,
            inserted = result.inserted,
            duplicates_skipped = result.duplicates_skipped,
            server_errors = result.errors.len() - client_errors.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "批量提交完成"
        );
        Ok(result)
    }
}

/// 合并服务端响应与本地错误
pub fn reconcile(
    submitted: usize,
    client_errors: &[RowError],
    response: ServerBatchResponse,
) -> UploadResult {
    let accounted = response.inserted.saturating_add(response.duplicates_skipped);
    let unaccounted = submitted.saturating_sub(accounted);
    if accounted != submitted {
        warn!(
            submitted = submitted,
            inserted = response.inserted,
            duplicates_skipped = response.duplicates_skipped,
            "服务端计数与提交数不一致"
        );
    }

    let mut errors: Vec<ReportedError> = client_errors.iter().map(ReportedError::from).collect();
    errors.extend(response.errors.iter().map(|entry| ReportedError {
        row: entry.row(),
        message: entry.message(),
        origin: ErrorOrigin::Server,
    }));

    UploadResult {
        submitted,
        inserted: response.inserted,
        duplicates_skipped: response.duplicates_skipped,
        unaccounted,
        errors,
    }
}
