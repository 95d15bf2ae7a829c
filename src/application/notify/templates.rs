//! Guest-facing email and calendar content
//!
//! The HTML template is table-based so it renders in Outlook. Copy is in
//! Brazilian Portuguese, matching the property's audience.

use crate::config::BrandConfig;
use crate::domain::Reservation;

// Gold & Graphite palette
const PRIMARY: &str = "#C9A44A";
const ACCENT: &str = "#B87333";
const TEXT: &str = "#0F172A";
const SUBTLE: &str = "#64748B";
const BG: &str = "#F7F7F9";
const CARD: &str = "#FFFFFF";
const BORDER: &str = "#E5E7EB";

/// Format an amount as Brazilian currency: `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let (reais, cents) = (cents / 100, (cents % 100).abs());
    let mut digits = reais.abs().to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let rest = digits.split_off(digits.len() - 3);
        grouped = format!(".{}{}", rest, grouped);
    }
    let sign = if reais < 0 { "-" } else { "" };
    format!("R$ {}{}{},{:02}", sign, digits, grouped, cents)
}

/// Plaintext notice sent right after intake, while payment is pending.
pub fn pending_text(reservation: &Reservation, brand: &BrandConfig, hold_minutes: i64) -> String {
    [
        format!("Olá, {}.", reservation.hospede_nome),
        format!(
            "Recebemos sua solicitação de reserva no {}.",
            reservation.flat_nome
        ),
        format!(
            "Período: {} → {} ({} noite(s))",
            reservation.checkin, reservation.checkout, reservation.noites
        ),
        format!("Total: {}", format_brl(reservation.total)),
        String::new(),
        format!(
            "Sua reserva está PENDENTE por até {} minutos, até a confirmação do pagamento.",
            hold_minutes
        ),
        "Após esse prazo, as datas podem ser liberadas automaticamente.".to_string(),
        String::new(),
        brand.name.clone(),
    ]
    .join("\n")
}

/// Plaintext twin of the confirmation email.
pub fn confirmation_text(reservation: &Reservation, brand: &BrandConfig) -> String {
    [
        format!("Olá, {}!", reservation.hospede_nome),
        "Sua reserva foi CONFIRMADA 🎉".to_string(),
        String::new(),
        format!("Flat: {}", reservation.flat_slug),
        format!(
            "Período: {} → {}",
            reservation.checkin, reservation.checkout
        ),
        "Check-in: 14:00 • Check-out: 12:00".to_string(),
        format!("Total: {}", format_brl(reservation.total)),
        String::new(),
        "Instruções de check-in:".to_string(),
        "• Apresente documento com foto na chegada;".to_string(),
        "• Silêncio após 22h.".to_string(),
        String::new(),
        "Política: Cancelamento grátis até 48h antes.".to_string(),
        String::new(),
        "Adicione ao seu calendário com o anexo \"reserva.ics\".".to_string(),
        String::new(),
        "Qualquer dúvida, fale com a gente:".to_string(),
        format!("WhatsApp: {}", brand.whatsapp),
        format!("E-mail: {}", brand.support_email),
        format!("{} — {}", brand.name, brand.address),
    ]
    .join("\n")
}

/// Table-based HTML confirmation email.
pub fn confirmation_html(reservation: &Reservation, brand: &BrandConfig) -> String {
    let total = format_brl(reservation.total);
    format!(
        r#"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="x-apple-disable-message-reformatting">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Reserva confirmada</title>
</head>
<body style="margin:0;padding:0;background:{bg};color:{text};font-family:-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;">
  <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse;background:{bg};">
    <tr><td align="center" style="padding:24px;">
      <table role="presentation" width="560" cellpadding="0" cellspacing="0" style="border-collapse:collapse;background:{card};border:1px solid {border};border-radius:12px;">
        <tr><td align="center" style="padding:24px 24px 8px;">
          <img src="{logo}" width="96" alt="{name}">
        </td></tr>
        <tr><td align="center" style="padding:0 24px;">
          <h1 style="margin:8px 0;font-size:22px;color:{text};">Reserva confirmada 🎉</h1>
          <p style="margin:0 0 16px;color:{subtle};">Olá, <strong>{guest}</strong>! Sua estadia está garantida.</p>
        </td></tr>
        <tr><td style="padding:8px 24px;">
          <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse;border:1px solid {border};border-radius:8px;">
            <tr>
              <td style="padding:12px 16px;border-bottom:1px solid {border};color:{subtle};">Flat</td>
              <td style="padding:12px 16px;border-bottom:1px solid {border};" align="right"><strong>{flat}</strong></td>
            </tr>
            <tr>
              <td style="padding:12px 16px;border-bottom:1px solid {border};color:{subtle};">Período</td>
              <td style="padding:12px 16px;border-bottom:1px solid {border};" align="right"><strong>{checkin} → {checkout}</strong></td>
            </tr>
            <tr>
              <td style="padding:12px 16px;border-bottom:1px solid {border};color:{subtle};">Check-in / Check-out</td>
              <td style="padding:12px 16px;border-bottom:1px solid {border};" align="right"><strong>14:00 / 12:00</strong></td>
            </tr>
            <tr>
              <td style="padding:12px 16px;color:{subtle};">Total</td>
              <td style="padding:12px 16px;" align="right"><strong style="color:{primary};">{total}</strong></td>
            </tr>
          </table>
        </td></tr>
        <tr><td style="padding:16px 24px;color:{text};">
          <p style="margin:0 0 8px;"><strong>Instruções de check-in</strong></p>
          <p style="margin:0;color:{subtle};">Apresente documento com foto na chegada. Silêncio após 22h.<br>
          Cancelamento grátis até 48h antes. O convite de calendário segue anexo (<code>reserva.ics</code>).</p>
        </td></tr>
        <tr><td align="center" style="padding:16px 24px 24px;border-top:1px solid {border};color:{subtle};font-size:13px;">
          <p style="margin:0;">WhatsApp: {whatsapp} • <a href="mailto:{support}" style="color:{accent};">{support}</a></p>
          <p style="margin:4px 0 0;"><a href="{site}" style="color:{accent};">{name}</a> — {address}</p>
        </td></tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#,
        bg = BG,
        card = CARD,
        border = BORDER,
        text = TEXT,
        subtle = SUBTLE,
        primary = PRIMARY,
        accent = ACCENT,
        logo = brand.logo_url,
        name = brand.name,
        site = brand.site,
        support = brand.support_email,
        whatsapp = brand.whatsapp,
        address = brand.address,
        guest = reservation.hospede_nome,
        flat = reservation.flat_slug,
        checkin = reservation.checkin,
        checkout = reservation.checkout,
        total = total,
    )
}

/// Description used both in the .ics invite and the guest's copy.
pub fn invite_description(reservation: &Reservation, brand: &BrandConfig) -> String {
    [
        "Reserva CONFIRMADA ✅".to_string(),
        format!("Hóspede: {}", reservation.hospede_nome),
        format!(
            "Período: {} → {}",
            reservation.checkin, reservation.checkout
        ),
        "Check-in: 14:00 • Check-out: 12:00".to_string(),
        format!("Total: {}", format_brl(reservation.total)),
        String::new(),
        "Instruções de check-in:".to_string(),
        "• Apresente documento com foto;".to_string(),
        "• Silêncio após 22h;".to_string(),
        String::new(),
        "Política: Cancelamento grátis até 48h antes.".to_string(),
        brand.name.clone(),
    ]
    .join("\n")
}

/// Summary of the operator-side calendar hold.
pub fn hold_summary(reservation: &Reservation) -> String {
    format!("Reserva confirmada — {}", reservation.hospede_nome)
}

/// Description of the operator-side calendar hold.
pub fn hold_description(reservation: &Reservation) -> String {
    format!(
        "Flat: {}\nPeríodo: {} → {}\nTotal: {}",
        reservation.flat_slug,
        reservation.checkin,
        reservation.checkout,
        format_brl(reservation.total)
    )
}
