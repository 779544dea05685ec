//! Server-rendered forms for the signup flow.

const STYLE: &str = "body{font-family:Arial,sans-serif;background:#0f172a;color:#e2e8f0;\
display:flex;justify-content:center;padding-top:80px}\
.card{background:#1e293b;padding:32px;border-radius:12px;width:340px}\
input{width:100%;padding:10px;margin:8px 0;border-radius:6px;border:1px solid #334155}\
button{width:100%;padding:10px;border:0;border-radius:6px;background:#38bdf8;cursor:pointer}\
a{color:#38bdf8}";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
<style>{style}</style><script src=\"/static/script.js\" defer></script></head>\
<body><div class=\"card\">{body}</div></body></html>",
        title = escape_html(title),
        style = STYLE,
        body = body
    )
}

pub fn signup_page() -> String {
    layout(
        "Sign up",
        "<h2>Verify your email</h2>\
<form method=\"post\" action=\"/signup\">\
<input type=\"email\" name=\"email\" placeholder=\"you@example.com\" required>\
<button type=\"submit\">Send OTP</button></form>",
    )
}

pub fn verify_page(ttl_seconds: i64) -> String {
    layout(
        "Enter OTP",
        &format!(
            "<h2>Enter your OTP</h2>\
<p id=\"timer\" data-expires-in=\"{ttl}\"></p>\
<form method=\"post\" action=\"/verify\">\
<input type=\"text\" name=\"otp\" inputmode=\"numeric\" maxlength=\"6\" autocomplete=\"one-time-code\" required>\
<button type=\"submit\">Verify</button></form>\
<p><a id=\"resend-btn\" href=\"/resend\">Resend OTP</a></p>",
            ttl = ttl_seconds
        ),
    )
}

pub fn dashboard_page(email: &str) -> String {
    layout(
        "Dashboard",
        &format!(
            "<h2>Email verified</h2><p>Signed in as <b>{}</b></p>\
<form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>",
            escape_html(email)
        ),
    )
}
