// ==========================================
// 学员名册导入系统 - 导入流程 API
// ==========================================
// 职责: 选择文件 → 等待确认 → 完成 的状态机
// 规则:
// - 文件级错误: 回到选择文件
// - 提交失败: 停留在确认步骤，已校验批次保留，可再次确认
// - 提交前任意时刻可放弃
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::roster::{ImportPreview, ImportReport};
use crate::importer::template::template_csv;
use crate::importer::{ImportResult, RosterImporter, RosterImporterImpl};
use crate::uploader::{BatchUploadClient, HttpBatchUploadClient, UploadSubmitter};
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

// ==========================================
// WorkflowStage - 流程阶段
// ==========================================
#[derive(Debug, Clone)]
pub enum WorkflowStage {
    SelectingFile,
    AwaitingConfirmation(ImportPreview),
    Completed(ImportReport),
}

impl WorkflowStage {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowStage::SelectingFile => "SELECTING_FILE",
            WorkflowStage::AwaitingConfirmation(_) => "AWAITING_CONFIRMATION",
            WorkflowStage::Completed(_) => "COMPLETED",
        }
    }
}

// ==========================================
// ImportWorkflow - 导入流程
// ==========================================
pub struct ImportWorkflow<U: BatchUploadClient> {
    importer: RosterImporterImpl,
    submitter: UploadSubmitter<U>,
    stage: WorkflowStage,
}

impl ImportWorkflow<HttpBatchUploadClient> {
    /// 按配置创建（HTTP 提交）
    pub fn from_config<C: ImportConfigReader + ?Sized>(config: &C) -> ApiResult<Self> {
        let importer = RosterImporterImpl::from_config(config)?;
        let client = HttpBatchUploadClient::from_config(config)?;
        Ok(Self::new(importer, client))
    }
}

impl<U: BatchUploadClient> ImportWorkflow<U> {
    pub fn new(importer: RosterImporterImpl, client: U) -> Self {
        Self {
            importer,
            submitter: UploadSubmitter::new(client),
            stage: WorkflowStage::SelectingFile,
        }
    }

    pub fn stage(&self) -> &WorkflowStage {
        &self.stage
    }

    pub fn upload_client(&self) -> &U {
        self.submitter.client()
    }

    /// 当前待确认批次
    pub fn preview(&self) -> Option<&ImportPreview> {
        match &self.stage {
            WorkflowStage::AwaitingConfirmation(preview) => Some(preview),
            _ => None,
        }
    }

    /// 最终报告
    pub fn report(&self) -> Option<&ImportReport> {
        match &self.stage {
            WorkflowStage::Completed(report) => Some(report),
            _ => None,
        }
    }

    fn invalid_state(&self, action: &str) -> ApiError {
        ApiError::InvalidState {
            stage: self.stage.name().to_string(),
            action: action.to_string(),
        }
    }

    // ==========================================
    // 选择文件
    // ==========================================

    /// 载入文件字节（重新选择文件会替换待确认批次）
    ///
    /// # 返回
    /// - Ok(ImportPreview): 进入确认步骤
    /// - Err(ApiError::Import): 文件被拒绝，回到选择文件
    pub fn load_file(
        &mut self,
        file_name: Option<&str>,
        mime_type: Option<&str>,
        bytes: &[u8],
    ) -> ApiResult<ImportPreview> {
        if matches!(self.stage, WorkflowStage::Completed(_)) {
            return Err(self.invalid_state("load_file"));
        }
        let result = self.importer.process(bytes, file_name, mime_type);
        self.enter_confirmation(result)
    }

    /// 载入本地文件
    pub fn load_path(&mut self, file_path: &Path) -> ApiResult<ImportPreview> {
        if matches!(self.stage, WorkflowStage::Completed(_)) {
            return Err(self.invalid_state("load_path"));
        }
        let result = self.importer.process_path(file_path);
        self.enter_confirmation(result)
    }

    fn enter_confirmation(
        &mut self,
        result: ImportResult<ImportPreview>,
    ) -> ApiResult<ImportPreview> {
        match result {
            Ok(preview) => {
                info!(batch_id = %preview.batch_id, valid = preview.summary.valid_rows, "等待用户确认");
                self.stage = WorkflowStage::AwaitingConfirmation(preview.clone());
                Ok(preview)
            }
            Err(e) => {
                warn!(error = %e, "文件被拒绝，回到选择文件");
                self.stage = WorkflowStage::SelectingFile;
                Err(e.into())
            }
        }
    }

    // ==========================================
    // 确认提交
    // ==========================================

    /// 确认并提交当前批次（一次请求）
    ///
    /// # 返回
    /// - Ok(ImportReport): 进入完成状态
    /// - Err(ApiError::Upload): 停留在确认步骤，批次保留
    pub async fn confirm_and_submit(&mut self) -> ApiResult<ImportReport> {
        // 等待期间批次留在确认阶段；future 被丢弃时批次不丢失
        let preview = match &self.stage {
            WorkflowStage::AwaitingConfirmation(preview) => preview,
            _ => return Err(self.invalid_state("confirm_and_submit")),
        };

        let outcome = self
            .submitter
            .submit(&preview.summary.ready_records, &preview.summary.errors)
            .await;

        match outcome {
            Ok(upload) => {
                let mut summary = preview.summary.clone();
                summary.duplicate_rows = upload.duplicates_skipped;

                let report = ImportReport {
                    batch_id: preview.batch_id.clone(),
                    file_name: preview.file_name.clone(),
                    summary,
                    upload,
                    completed_at: Utc::now(),
                };
                info!(batch_id = %report.batch_id, inserted = report.upload.inserted, "导入完成");
                self.stage = WorkflowStage::Completed(report.clone());
                Ok(report)
            }
            Err(e) => {
                warn!(batch_id = %preview.batch_id, error = %e, "提交失败，停留在确认步骤");
                Err(e.into())
            }
        }
    }

    // ==========================================
    // 放弃 / 重新开始
    // ==========================================

    /// 放弃当前批次（提交前任意时刻）
    pub fn discard(&mut self) -> ApiResult<()> {
        if matches!(self.stage, WorkflowStage::Completed(_)) {
            return Err(self.invalid_state("discard"));
        }
        if let Some(preview) = self.preview() {
            info!(batch_id = %preview.batch_id, "放弃待确认批次");
        }
        self.stage = WorkflowStage::SelectingFile;
        Ok(())
    }

    /// 完成后开始新一轮导入
    pub fn start_over(&mut self) {
        self.stage = WorkflowStage::SelectingFile;
    }

    /// 下载模板
    pub fn template_csv(&self) -> ApiResult<String> {
        Ok(template_csv()?)
    }
}
