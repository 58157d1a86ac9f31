//! Preset agent teams

use crate::agents::{AgentRecord, DEFAULT_MODEL};

pub const DEFAULT_COMPANY: &str = "Investment Firm";

/// Agent made active after a team is created
pub const FINANCE_LEAD: &str = "Risk_Analyst";

/// The four finance specialists, with instructions naming `company`.
///
/// Each role's instructions describe when to hand off to the others, so the
/// model has a reason to call the transfer tools.
pub fn finance_team(company: &str) -> Vec<AgentRecord> {
    vec![
        AgentRecord::new(
            "Risk_Analyst",
            DEFAULT_MODEL,
            format!(
                "You are a quantitative risk analyst for {company}. When users ask about portfolio \
                 optimization or investment strategies, transfer to the Portfolio Manager. For market \
                 research questions, transfer to the Research Analyst. You specialize in VaR, stress \
                 testing, and risk metrics."
            ),
        ),
        AgentRecord::new(
            "Portfolio_Manager",
            DEFAULT_MODEL,
            format!(
                "You are a portfolio manager for {company}. When users ask about risk calculations, \
                 transfer to the Risk Analyst. For market analysis, transfer to the Research Analyst. \
                 For data questions, transfer to the Data Analyst. You specialize in optimization and \
                 asset allocation."
            ),
        ),
        AgentRecord::new(
            "Data_Analyst",
            DEFAULT_MODEL,
            format!(
                "You are a financial data analyst for {company}. When users ask about risk assessment, \
                 transfer to the Risk Analyst. For investment advice, transfer to the Portfolio Manager. \
                 You specialize in data collection and analysis."
            ),
        ),
        AgentRecord::new(
            "Research_Analyst",
            DEFAULT_MODEL,
            format!(
                "You are a research analyst for {company}. When users ask about portfolio optimization, \
                 transfer to the Portfolio Manager. For risk questions, transfer to the Risk Analyst. \
                 You specialize in market research and investment analysis."
            ),
        ),
    ]
}
