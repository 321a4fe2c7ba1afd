//! Date-range management report: the printable summary the office issues for
//! a chosen period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{InfractionRecord, InspectionRecord, NotificationKind, NotificationRecord};
use super::stats::{law_frequency, LabelCount, LAW_RANKING_LIMIT};

/// Inclusive calendar range the report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Whole days covered, never below one so the averages stay defined.
    pub fn span_days(&self) -> i64 {
        ((self.to - self.from).num_days() + 1).max(1)
    }
}

/// Aggregate counts for the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagementReport {
    pub range: ReportRange,
    pub total_notifications: usize,
    pub total_infractions: usize,
    pub total_inspections: usize,
    pub ex_officio_inspections: usize,
    pub audience_notifications: usize,
    pub imputation_notifications: usize,
    pub expired_products: u32,
    pub law_ranking: Vec<LabelCount>,
    pub daily_notification_average: f64,
    pub daily_infraction_average: f64,
}

impl ManagementReport {
    pub fn build(
        range: ReportRange,
        notifications: &[NotificationRecord],
        infractions: &[InfractionRecord],
        inspections: &[InspectionRecord],
    ) -> Self {
        let notifications: Vec<&NotificationRecord> = notifications
            .iter()
            .filter(|n| range.contains(n.entry_date))
            .collect();
        let infractions: Vec<InfractionRecord> = infractions
            .iter()
            .filter(|i| range.contains(i.entry_date))
            .cloned()
            .collect();
        let inspections: Vec<&InspectionRecord> = inspections
            .iter()
            .filter(|i| range.contains(i.date))
            .collect();

        let span = range.span_days() as f64;
        Self {
            range,
            total_notifications: notifications.len(),
            total_infractions: infractions.len(),
            total_inspections: inspections.len(),
            ex_officio_inspections: inspections.iter().filter(|i| i.ex_officio).count(),
            audience_notifications: notifications
                .iter()
                .filter(|n| n.kind == NotificationKind::Audience)
                .count(),
            imputation_notifications: notifications
                .iter()
                .filter(|n| n.kind == NotificationKind::Imputation)
                .count(),
            expired_products: infractions.iter().map(|i| i.expired_products).sum(),
            law_ranking: law_frequency(&infractions, LAW_RANKING_LIMIT),
            daily_notification_average: notifications.len() as f64 / span,
            daily_infraction_average: infractions.len() as f64 / span,
        }
    }

    /// Standalone printable document; opens the browser print dialog on
    /// load, as the office expects from the report tab.
    pub fn render_html(&self, issued_on: NaiveDate) -> String {
        let law_rows: String = if self.law_ranking.is_empty() {
            "<li class=\"muted\">Sin actas registradas en el período</li>".to_string()
        } else {
            self.law_ranking
                .iter()
                .map(|entry| format!("<li><span>{}</span><strong>{}</strong></li>", entry.label, entry.count))
                .collect()
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Informe de Gestión - Lealtad Comercial</title>
<style>
  body {{ font-family: sans-serif; color: #1f2937; max-width: 210mm; margin: 0 auto; padding: 2rem; }}
  header {{ border-bottom: 4px solid #0a4c83; padding-bottom: 1rem; margin-bottom: 1.5rem; }}
  h1 {{ color: #0a4c83; margin: 0; }}
  .sub {{ color: #4fa7ff; text-transform: uppercase; letter-spacing: .1em; font-size: .8rem; }}
  .issued {{ color: #6b7280; font-size: .75rem; }}
  .summary {{ background: #eff6ff; border: 1px solid #dbeafe; border-radius: .5rem; padding: 1rem; margin-bottom: 1.5rem; }}
  .metrics {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: .75rem; margin-bottom: 1.5rem; }}
  .metric {{ border: 1px solid #e5e7eb; border-radius: .5rem; padding: .75rem; }}
  .metric .value {{ font-size: 1.5rem; font-weight: 700; color: #0a4c83; }}
  .metric .label {{ font-size: .65rem; text-transform: uppercase; color: #6b7280; }}
  .breakdown li, .laws li {{ display: flex; justify-content: space-between; padding: .4rem 0; border-bottom: 1px solid #f3f4f6; }}
  ul {{ list-style: none; padding: 0; }}
  .muted {{ color: #9ca3af; }}
  footer {{ margin-top: 2rem; border-top: 1px solid #d1d5db; padding-top: .5rem; font-size: .65rem; color: #9ca3af; display: flex; justify-content: space-between; text-transform: uppercase; }}
  @media print {{ @page {{ margin: 1cm; size: A4; }} }}
</style>
</head>
<body>
<header>
  <h1>LEALTAD COMERCIAL</h1>
  <div class="sub">Ministerio de Industria, Comercio y Empleo</div>
  <div class="sub">Provincia de Catamarca</div>
  <div class="issued">Emitido el: {issued}</div>
</header>
<section class="summary">
  <h2>Informe de Gestión Administrativa</h2>
  <p>Actuaciones del Departamento de Lealtad Comercial entre el <strong>{from}</strong> y el <strong>{to}</strong>.</p>
</section>
<section class="metrics">
  <div class="metric"><div class="value">{notifs}</div><div class="label">Notificaciones</div></div>
  <div class="metric"><div class="value">{actas}</div><div class="label">Actas Infracción</div></div>
  <div class="metric"><div class="value">{inspections}</div><div class="label">Actas Inspección</div></div>
  <div class="metric"><div class="value">{expired}</div><div class="label">Prod. Vencidos</div></div>
</section>
<section>
  <h3>Desglose Operativo</h3>
  <ul class="breakdown">
    <li><span>Audiencias Programadas</span><strong>{audiences}</strong></li>
    <li><span>Autos de Imputación</span><strong>{imputations}</strong></li>
    <li><span>Actuaciones de Oficio</span><strong>{ex_officio}</strong></li>
    <li><span>Promedio Diario (Notif.)</span><strong>{avg_notifs:.1}</strong></li>
    <li><span>Promedio Diario (Actas)</span><strong>{avg_actas:.1}</strong></li>
  </ul>
</section>
<section>
  <h3>Ranking de Leyes Infringidas</h3>
  <ul class="laws">{law_rows}</ul>
</section>
<footer>
  <span>Departamento Lealtad Comercial</span>
  <span>Sistema de Gestión Interna</span>
</footer>
<script>window.print();</script>
</body>
</html>
"#,
            issued = issued_on,
            from = self.range.from,
            to = self.range.to,
            notifs = self.total_notifications,
            actas = self.total_infractions,
            inspections = self.total_inspections,
            expired = self.expired_products,
            audiences = self.audience_notifications,
            imputations = self.imputation_notifications,
            ex_officio = self.ex_officio_inspections,
            avg_notifs = self.daily_notification_average,
            avg_actas = self.daily_infraction_average,
            law_rows = law_rows,
        )
    }
}
