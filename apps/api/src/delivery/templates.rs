//! Subjects and HTML bodies for the team mail and the sender's copy.
//! Every interpolated value is HTML-escaped.

use chrono::NaiveDate;

use crate::locale::{LetterLocale, LocaleCode};
use crate::models::SenderProfile;
use crate::recipients::ResolvedRecipientList;

struct MailPhrases {
    team_sender_name: &'static str,
    copy_sender_name: &'static str,
    team_subject: &'static str,
    copy_subject: &'static str,
    new_submission: &'static str,
    date: &'static str,
    sender: &'static str,
    email: &'static str,
    recipients: &'static str,
    subject: &'static str,
    copy_intro: &'static str,
    copy_first_only: &'static str,
    copy_all: &'static str,
}

const GERMAN: MailPhrases = MailPhrases {
    team_sender_name: "Kampagnen-Formular",
    copy_sender_name: "Kampagnen-Team",
    team_subject: "Vorgang {id}: Brief(e) an MdB",
    copy_subject: "Kopie Ihrer Einreichung – Vorgang {id}",
    new_submission: "Neue Einreichung",
    date: "Datum",
    sender: "Absender:in",
    email: "E-Mail",
    recipients: "Empfänger",
    subject: "Betreff",
    copy_intro: "Danke – wir haben Ihren Brief übernommen und bereiten den Postversand vor.",
    copy_first_only: "Im Anhang finden Sie die PDF-Version Ihres Briefes (erste Empfänger:in).",
    copy_all: "Im Anhang finden Sie alle Briefe dieses Vorgangs.",
};

const ENGLISH: MailPhrases = MailPhrases {
    team_sender_name: "Campaign form",
    copy_sender_name: "Campaign team",
    team_subject: "Process {id}: letter(s) to MPs",
    copy_subject: "Copy of your submission – process {id}",
    new_submission: "New submission",
    date: "Date",
    sender: "Sender",
    email: "Email",
    recipients: "Recipients",
    subject: "Subject",
    copy_intro: "Thank you – we have received your letter and are preparing it for posting.",
    copy_first_only: "Attached is the PDF of your letter (first recipient).",
    copy_all: "Attached are all letters of this process.",
};

fn phrases(locale: &LetterLocale) -> &'static MailPhrases {
    match locale.code {
        LocaleCode::De => &GERMAN,
        LocaleCode::En => &ENGLISH,
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn team_sender_name(locale: &LetterLocale) -> &'static str {
    phrases(locale).team_sender_name
}

pub fn copy_sender_name(locale: &LetterLocale) -> &'static str {
    phrases(locale).copy_sender_name
}

pub fn team_subject(locale: &LetterLocale, process_id: &str) -> String {
    phrases(locale).team_subject.replace("{id}", process_id)
}

pub fn copy_subject(locale: &LetterLocale, process_id: &str) -> String {
    phrases(locale).copy_subject.replace("{id}", process_id)
}

/// Internal notification: who sent what to whom.
pub fn team_html(
    locale: &LetterLocale,
    process_id: &str,
    date: NaiveDate,
    sender: &SenderProfile,
    recipients: &ResolvedRecipientList,
    subject: &str,
) -> String {
    let p = phrases(locale);
    let recipient_lines = recipients
        .iter()
        .map(|r| {
            let mut line = r.name.clone();
            if let Some(aff) = r.affiliation.as_deref() {
                line.push_str(" – ");
                line.push_str(aff);
            }
            if let Some(region) = r.region.as_deref() {
                line.push_str(&format!(" ({region})"));
            }
            escape_html(&line)
        })
        .collect::<Vec<_>>()
        .join("<br>");

    format!(
        "<h2>{new} – {id}</h2>\n\
         <p><b>{date_label}:</b> {date}</p>\n\
         <p><b>{sender_label}</b><br>\n\
         {first} {last}<br>\n\
         {street}<br>\n\
         {zip} {city}<br>\n\
         {email_label}: {email}</p>\n\
         <p><b>{recipients_label} ({count}):</b><br>\n\
         {recipient_lines}</p>\n\
         <p><b>{subject_label}:</b> {subject}</p>\n",
        new = p.new_submission,
        id = escape_html(process_id),
        date_label = p.date,
        date = date.format("%Y-%m-%d"),
        sender_label = p.sender,
        first = escape_html(&sender.first_name),
        last = escape_html(&sender.last_name),
        street = escape_html(&sender.street),
        zip = escape_html(&sender.zip),
        city = escape_html(&sender.city),
        email_label = p.email,
        email = escape_html(&sender.email),
        recipients_label = p.recipients,
        count = recipients.len(),
        recipient_lines = recipient_lines,
        subject_label = p.subject,
        subject = escape_html(subject),
    )
}

/// Confirmation for the sender. `all_documents` selects the attachment note.
pub fn copy_html(locale: &LetterLocale, process_id: &str, subject: &str, all_documents: bool) -> String {
    let p = phrases(locale);
    format!(
        "<p>{intro}</p>\n\
         <p><b>{id_label}:</b> {id}</p>\n\
         <hr>\n\
         <p><b>{subject_label}:</b> {subject}</p>\n\
         <p>{note}</p>\n",
        intro = p.copy_intro,
        id_label = locale.process_id_label,
        id = escape_html(process_id),
        subject_label = p.subject,
        subject = escape_html(subject),
        note = if all_documents { p.copy_all } else { p.copy_first_only },
    )
}
