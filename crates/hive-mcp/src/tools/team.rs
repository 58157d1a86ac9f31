//! Preset team tool

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};

use hive_core::Hive;
use hive_core::teams::DEFAULT_COMPANY;

use super::{ToolHandler, ToolOutput, json_schema, optional_str};

/// Create the four finance specialists, skipping any that already exist
pub struct CreateFinanceTeamTool;

#[async_trait]
impl ToolHandler for CreateFinanceTeamTool {
    fn name(&self) -> &str {
        "create_finance_team"
    }

    fn description(&self) -> &str {
        "Create coordinated finance team with Swarm handoffs"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            json!({
                "company_name": {
                    "type": "string",
                    "default": DEFAULT_COMPANY
                }
            }),
            vec![],
        )
    }

    async fn execute(&self, hive: &mut Hive, input: Value) -> Result<ToolOutput> {
        let company = optional_str(&input, "company_name")?;
        let report = hive.create_finance_team(company);

        let mut out = format!("✅ **Swarm Finance Team for {}**\n\n", report.company);
        if report.created.is_empty() {
            out.push_str(&format!("**Team already exists for {}**", report.company));
            return Ok(ToolOutput::success(out));
        }

        out.push_str(&format!(
            "**Created agents with transfer capabilities:** {}\n\n",
            report.created.join(", ")
        ));
        if !report.existing.is_empty() {
            out.push_str(&format!(
                "**Already present (unchanged):** {}\n\n",
                report.existing.join(", ")
            ));
        }
        out.push_str("🔄 **Swarm Features Enabled:**\n");
        out.push_str("• Automatic agent handoffs based on expertise\n");
        out.push_str("• Shared conversation context\n");
        out.push_str("• Intelligent routing between specialists\n\n");
        out.push_str("💡 **Try multi-step queries** - agents will coordinate automatically!");
        Ok(ToolOutput::success(out))
    }
}
