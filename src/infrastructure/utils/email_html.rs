use ammonia::clean_text;

use crate::entities::contact::ContactForm;

/// Renders a contact submission as the HTML body of the notification email.
/// Every user supplied value is escaped.
pub fn render_contact_email(form: &ContactForm) -> String {
    let message = clean_text(form.message.trim()).replace("&#10;", "<br>");

    format!(
        r#"<div style="font-family: sans-serif; line-height: 1.5;">
  <h2>New portfolio contact message</h2>
  <p><strong>Name:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Subject:</strong> {subject}</p>
  <hr>
  <p>{message}</p>
</div>"#,
        name = clean_text(form.name.trim()),
        email = clean_text(form.email.trim()),
        subject = clean_text(form.subject.trim()),
        message = message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        let form = ContactForm {
            name: "<script>alert(1)</script>".into(),
            email: "a@b.co".into(),
            subject: "Hi there".into(),
            message: "line one\nline <b>two</b>".into(),
        };
        let html = render_contact_email(&form);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>two</b>"));
        assert!(html.contains("one<br>line"));
    }
}
