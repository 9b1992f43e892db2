//! Plain-text reports for analysis results.
//!
//! The generic renderers take labels from the caller so they work for
//! problem files as well as the built-in program models.

use crate::domain::mcdm::{
    ComparisonMatrix, ConsistencyReport, DeaSweep, SensitivityReport, TargetAdjustment,
    TopsisResult, TopsisSensitivity,
};
use crate::domain::pricing::{
    IncentiveAnalysis, InputSpecResult, PlanDiagnosis, PricingRanking, PricingModel,
    INCENTIVE_CRITERIA, INCENTIVE_JUDGMENTS, INPUT_LABELS, OUTPUT_LABELS, PRICING_CRITERIA,
};

const RULE_WIDTH: usize = 70;

/// Line-oriented report builder.
#[derive(Debug, Default)]
struct Report {
    lines: Vec<String>,
}

impl Report {
    fn titled(title: &str) -> Self {
        let mut report = Self::default();
        report.rule();
        report.line(title);
        report.rule();
        report
    }

    fn rule(&mut self) {
        self.lines.push("=".repeat(RULE_WIDTH));
    }

    fn section(&mut self, name: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("## {name}"));
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn finish(mut self) -> String {
        self.lines.push(String::new());
        self.rule();
        self.lines.join("\n")
    }
}

fn label(labels: &[String], i: usize, prefix: &str) -> String {
    labels
        .get(i)
        .cloned()
        .unwrap_or_else(|| format!("{prefix}{i}"))
}

fn percent(weight: f64) -> String {
    format!("{:.1}%", weight * 100.0)
}

// ════════════════════════════════════════════════════════════════════════════
// AHP
// ════════════════════════════════════════════════════════════════════════════

fn push_matrix(report: &mut Report, matrix: &ComparisonMatrix, labels: &[String]) {
    let header: String = (0..matrix.size())
        .map(|j| format!("{:>12}", label(labels, j, "C")))
        .collect();
    report.line(format!("  {:<14}{header}", ""));
    for (i, row) in matrix.to_rows().iter().enumerate() {
        let cells: String = row.iter().map(|v| format!("{v:>12.3}")).collect();
        report.line(format!("  {:<14}{cells}", label(labels, i, "C")));
    }
}

fn push_consistency(report: &mut Report, consistency: &ConsistencyReport, labels: &[String]) {
    report.section("Priority Weights");
    for (i, w) in consistency.weights.iter().enumerate() {
        report.line(format!("  {:<15}: {w:.4} ({})", label(labels, i, "C"), percent(*w)));
    }

    report.section("Consistency Check");
    report.line(format!("  λ_max = {:.4}", consistency.lambda_max));
    report.line(format!("  CI = {:.4}", consistency.ci));
    report.line(format!("  RI = {:.2} (for n={})", consistency.ri, consistency.weights.len()));
    report.line(format!("  CR = {:.4}", consistency.cr));
    report.line(format!("  Status: {}", consistency.message));

    report.section("Priority Ranking");
    for (rank, i) in consistency.priority_order().into_iter().enumerate() {
        report.line(format!(
            "  {}. {}: {}",
            rank + 1,
            label(labels, i, "C"),
            percent(consistency.weights[i])
        ));
    }
}

fn push_ahp_sensitivity(report: &mut Report, sensitivity: &SensitivityReport) {
    report.section(&format!(
        "Judgment Sensitivity (±{:.0}%)",
        sensitivity.variation * 100.0
    ));
    for v in &sensitivity.variations {
        let status = if v.is_consistent { "consistent" } else { "INCONSISTENT" };
        report.line(format!(
            "  {:<14} value {:>7.3}  max Δw {:.4}  CR {:.4} ({status})",
            v.key(),
            v.new_value,
            v.max_abs_change(),
            v.cr
        ));
    }
}

/// Report for an arbitrary comparison matrix.
pub fn ahp_report(
    title: &str,
    matrix: &ComparisonMatrix,
    labels: &[String],
    consistency: &ConsistencyReport,
    sensitivity: Option<&SensitivityReport>,
) -> String {
    let mut report = Report::titled(title);
    report.section("Pairwise Comparison Matrix");
    push_matrix(&mut report, matrix, labels);
    push_consistency(&mut report, consistency, labels);
    if let Some(sensitivity) = sensitivity {
        push_ahp_sensitivity(&mut report, sensitivity);
    }
    report.finish()
}

/// Report for the incentive-criteria AHP.
pub fn incentive_report(analysis: &IncentiveAnalysis) -> String {
    let labels: Vec<String> = INCENTIVE_CRITERIA.iter().map(|c| c.short.to_string()).collect();

    let mut report = Report::titled("AHP ANALYSIS: Incentive Mechanism Criteria Weights");
    report.section("Criteria");
    for (i, c) in INCENTIVE_CRITERIA.iter().enumerate() {
        report.line(format!("  C{i}: {} - {}", c.name, c.description));
    }

    report.section("Pairwise Comparison Matrix (Saaty Scale 1-9)");
    push_matrix(&mut report, &analysis.matrix, &labels);

    report.section("Comparison Rationale");
    for j in &INCENTIVE_JUDGMENTS {
        report.line(format!("  C{} vs C{}: {:.2}", j.pair.0, j.pair.1, j.value));
        report.line(format!("    -> {}", j.interpretation));
    }

    push_consistency(&mut report, &analysis.consistency, &labels);
    push_ahp_sensitivity(&mut report, &analysis.sensitivity);
    report.finish()
}

// ════════════════════════════════════════════════════════════════════════════
// TOPSIS
// ════════════════════════════════════════════════════════════════════════════

fn push_ranking(report: &mut Report, result: &TopsisResult) {
    report.section("TOPSIS Results");
    report.line("  Closeness Scores (higher = better):");
    for (rank, (name, score)) in result
        .ranked_names
        .iter()
        .zip(&result.ranked_scores)
        .enumerate()
    {
        report.line(format!("    {}. {name:<18}: C* = {score:.4}", rank + 1));
    }
}

fn push_topsis_sensitivity(report: &mut Report, sensitivity: &TopsisSensitivity, labels: &[String]) {
    report.section(&format!(
        "Weight Sensitivity (±{:.0}%)",
        sensitivity.variation * 100.0
    ));
    for v in &sensitivity.variations {
        let change = format!(
            "{} {} by {:.0}%",
            label(labels, v.criterion, "C"),
            v.direction.verb(),
            sensitivity.variation * 100.0
        );
        if v.ranking_changed {
            report.line(format!(
                "  CHANGED {change}: ranking now {}",
                v.ranked_names.join(" > ")
            ));
        } else {
            report.line(format!("  stable  {change}"));
        }
    }
}

/// Report for an arbitrary TOPSIS run.
pub fn topsis_report(
    title: &str,
    criteria: &[String],
    result: &TopsisResult,
    sensitivity: Option<&TopsisSensitivity>,
) -> String {
    let mut report = Report::titled(title);
    report.section("Criteria Weights");
    for (i, w) in result.weights.iter().enumerate() {
        report.line(format!("  {:<15}: {w:.4} ({})", label(criteria, i, "C"), percent(*w)));
    }
    push_ranking(&mut report, result);
    if let Some(sensitivity) = sensitivity {
        push_topsis_sensitivity(&mut report, sensitivity, criteria);
    }
    report.finish()
}

/// Report for the pricing-scenario TOPSIS.
pub fn pricing_report(ranking: &PricingRanking, sensitivity: Option<&TopsisSensitivity>) -> String {
    let labels: Vec<String> = PRICING_CRITERIA.iter().map(|c| c.short.to_string()).collect();

    let mut report = Report::titled("TOPSIS ANALYSIS: Pricing Scenario Ranking");
    report.section("Pricing Scenarios");
    for s in PricingModel::scenarios() {
        report.line(format!("  {}: {}", s.name, s.description));
        report.line(format!(
            "    Subsidy: ₹{} ({:.1}%) | Monthly Fee: ₹{} | Tenure: {} months",
            s.subsidy, s.subsidy_percent, s.monthly_fee, s.tenure_months
        ));
    }

    report.section("Criteria Weights");
    for (c, w) in PRICING_CRITERIA.iter().zip(&ranking.topsis.weights) {
        report.line(format!(
            "  {:<12}: {w:.4} ({}) - {}",
            c.short,
            percent(*w),
            c.criterion_type
        ));
    }

    report.section("Decision Matrix (Estimated)");
    report.line(format!(
        "  {:<18} | {:>8} | {:>8} | {:>9} | {:>7} | {:>8}",
        "Scenario", "Savings%", "Margin%", "Breakeven", "Churn%", "Adoption"
    ));
    for (s, m) in PricingModel::scenarios().iter().zip(&ranking.metrics) {
        report.line(format!(
            "  {:<18} | {:>7.1}% | {:>7.1}% | {:>6.0} mo | {:>6.1}% | {:>8.0}",
            s.name,
            m.customer_savings,
            m.company_margin,
            m.breakeven_months,
            m.churn_risk,
            m.adoption_score
        ));
    }

    push_ranking(&mut report, &ranking.topsis);

    if let Some(best) = ranking.recommended() {
        report.section("Recommendation");
        report.line(format!("  RECOMMENDED: {}", best.name));
        report.line(format!("    -> {}", best.description));
        report.line(format!(
            "    -> Subsidy: ₹{} | Fee: ₹{}",
            best.subsidy, best.monthly_fee
        ));
        report.line(format!("    -> Rationale: {}", best.rationale));
    }

    if let Some(sensitivity) = sensitivity {
        push_topsis_sensitivity(&mut report, sensitivity, &labels);
    }
    report.finish()
}

// ════════════════════════════════════════════════════════════════════════════
// DEA
// ════════════════════════════════════════════════════════════════════════════

fn push_sweep(report: &mut Report, sweep: &DeaSweep, output_labels: &[String], input_labels: &[String]) {
    report.section("Efficiency Scores");
    report.line(format!("  Orientation: {}-oriented", sweep.orientation));
    for (i, name) in sweep.names.iter().enumerate() {
        let result = &sweep.results[i];
        let status = match result.efficiency() {
            None => format!("{}", result.status),
            Some(_) if result.is_efficient() => "EFFICIENT (on frontier)".to_string(),
            Some(e) => format!("inefficient ({:.1}% below frontier)", (1.0 - e) * 100.0),
        };
        report.line(format!("  {name:<14}: {:.4}  {status}", sweep.efficiencies[i]));
    }

    report.section("Efficient Frontier");
    report.line(format!("  {}", sweep.frontier_names().join(", ")));
    if !sweep.failed_dmus.is_empty() {
        let failed: Vec<&str> = sweep.failed_dmus.iter().map(|&i| sweep.names[i].as_str()).collect();
        report.line(format!("  Failed to solve: {}", failed.join(", ")));
    }

    if sweep.improvement_targets.is_empty() {
        return;
    }
    report.section("Improvement Targets");
    for target in &sweep.improvement_targets {
        match &target.adjustment {
            TargetAdjustment::Output {
                current_outputs,
                target_outputs,
                improvement_percent,
                ..
            } => {
                report.line(format!(
                    "  {}: increase outputs by {improvement_percent:.1}%",
                    target.name
                ));
                for (r, (c, t)) in current_outputs.iter().zip(target_outputs).enumerate() {
                    report.line(format!(
                        "    {:<16}: {c:>10.1} -> {t:>10.1}",
                        label(output_labels, r, "Output ")
                    ));
                }
            }
            TargetAdjustment::Input {
                current_inputs,
                target_inputs,
                reduction_percent,
                ..
            } => {
                report.line(format!(
                    "  {}: reduce inputs by {reduction_percent:.1}%",
                    target.name
                ));
                for (i, (c, t)) in current_inputs.iter().zip(target_inputs).enumerate() {
                    report.line(format!(
                        "    {:<16}: {c:>10.1} -> {t:>10.1}",
                        label(input_labels, i, "Input ")
                    ));
                }
            }
        }
    }
}

/// Report for an arbitrary DEA sweep.
pub fn dea_report(
    title: &str,
    sweep: &DeaSweep,
    input_labels: &[String],
    output_labels: &[String],
) -> String {
    let mut report = Report::titled(title);
    push_sweep(&mut report, sweep, output_labels, input_labels);
    report.finish()
}

/// Report for the subscription-plan DEA.
pub fn plan_report(
    sweep: &DeaSweep,
    diagnoses: &[PlanDiagnosis],
    input_specs: &[InputSpecResult],
) -> String {
    let input_labels: Vec<String> = INPUT_LABELS.iter().map(|l| l.to_string()).collect();
    let output_labels: Vec<String> = OUTPUT_LABELS.iter().map(|l| l.to_string()).collect();

    let mut report = Report::titled("DEA ANALYSIS: Subscription Plan Efficiency");
    report.section("Input-Output Specification");
    report.line(format!("  INPUTS: {}", INPUT_LABELS.join(", ")));
    report.line(format!("  OUTPUTS: {}", OUTPUT_LABELS.join(", ")));

    push_sweep(&mut report, sweep, &output_labels, &input_labels);

    if !diagnoses.is_empty() {
        report.section("Plan Diagnosis");
        for diagnosis in diagnoses {
            report.line(format!("  {}", diagnosis.message()));
            if let PlanDiagnosis::Inefficient {
                reference_plans,
                recommendations,
                ..
            } = diagnosis
            {
                report.line(format!("    Reference plans: {}", reference_plans.join(", ")));
                for r in recommendations {
                    report.line(format!(
                        "    {:<16}: {:.1} -> {:.1} (+{:.1}%)",
                        r.metric, r.current, r.target, r.increase_percent
                    ));
                }
            }
        }
    }

    if !input_specs.is_empty() {
        report.section("Input Specification Sensitivity");
        for spec in input_specs {
            let scores: Vec<String> = spec.efficiencies.iter().map(|e| format!("{e:.4}")).collect();
            report.line(format!(
                "  {:<14}: [{}] frontier: {}",
                spec.label,
                scores.join(", "),
                spec.frontier.join(", ")
            ));
        }
    }

    report.finish()
}
