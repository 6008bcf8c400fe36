pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset";

pub fn render_password_reset(reset_url: &str, uid: &str, token: &str, valid_hours: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset</h2>
    <p>Click the link below to reset your password:</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Reset Password</a></p>
    <p style="color: #666; font-size: 14px;">If the link does not work, submit these values to the reset form:</p>
    <p style="font-family: monospace; font-size: 13px;">uid: {uid}<br>token: {token}</p>
    <p style="color: #666; font-size: 14px;">This link expires in {valid_hours} hours. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}
