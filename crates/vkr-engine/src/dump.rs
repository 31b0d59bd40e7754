//! Optional on-exit diagnostics: DOT graphs of pipeline state and
//! command-buffer ownership, written as `pipeline_dump.dot` and
//! `cb_dump.dot` in the configured directory.

use std::io::Write;
use std::path::Path;

use vkr_protocol::RecordedHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Graphics,
    Compute,
}

struct PipelineRecord {
    recorded: RecordedHandle,
    kind: PipelineKind,
    layout: RecordedHandle,
    render_pass: RecordedHandle,
    stage_count: usize,
}

struct CommandBufferRecord {
    recorded: RecordedHandle,
    pool: RecordedHandle,
}

#[derive(Default)]
pub struct StateDump {
    pipelines: Vec<PipelineRecord>,
    command_buffers: Vec<CommandBufferRecord>,
}

impl StateDump {
    pub(crate) fn record_pipeline(
        &mut self,
        recorded: RecordedHandle,
        kind: PipelineKind,
        layout: RecordedHandle,
        render_pass: RecordedHandle,
        stage_count: usize,
    ) {
        self.pipelines.push(PipelineRecord {
            recorded,
            kind,
            layout,
            render_pass,
            stage_count,
        });
    }

    pub(crate) fn forget_pipeline(&mut self, recorded: RecordedHandle) {
        self.pipelines.retain(|p| p.recorded != recorded);
    }

    pub(crate) fn record_command_buffer(&mut self, recorded: RecordedHandle, pool: RecordedHandle) {
        self.command_buffers.push(CommandBufferRecord { recorded, pool });
    }

    pub(crate) fn forget_command_buffer(&mut self, recorded: RecordedHandle) {
        self.command_buffers.retain(|c| c.recorded != recorded);
    }

    pub fn write_dot(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;

        let mut out = std::fs::File::create(dir.join("pipeline_dump.dot"))?;
        writeln!(out, "digraph pipelines {{")?;
        writeln!(out, "    rankdir=LR;")?;
        for p in &self.pipelines {
            let label = match p.kind {
                PipelineKind::Graphics => "graphics",
                PipelineKind::Compute => "compute",
            };
            writeln!(
                out,
                "    \"pipeline_{:#x}\" [label=\"{} pipeline {:#x}\\n{} stage(s)\"];",
                p.recorded.raw(),
                label,
                p.recorded.raw(),
                p.stage_count
            )?;
            if !p.layout.is_null() {
                writeln!(
                    out,
                    "    \"pipeline_{:#x}\" -> \"layout_{:#x}\";",
                    p.recorded.raw(),
                    p.layout.raw()
                )?;
            }
            if !p.render_pass.is_null() {
                writeln!(
                    out,
                    "    \"pipeline_{:#x}\" -> \"renderpass_{:#x}\";",
                    p.recorded.raw(),
                    p.render_pass.raw()
                )?;
            }
        }
        writeln!(out, "}}")?;

        let mut out = std::fs::File::create(dir.join("cb_dump.dot"))?;
        writeln!(out, "digraph command_buffers {{")?;
        for c in &self.command_buffers {
            writeln!(
                out,
                "    \"pool_{:#x}\" -> \"cb_{:#x}\";",
                c.pool.raw(),
                c.recorded.raw()
            )?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}
