use chrono::{Datelike, Utc};
use hypertext::prelude::*;

pub const OTP_SUBJECT: &str = "JRMSU TABULATION OTP CODE";

pub struct OtpEmail<S> {
    pub code: S,
    pub year: i32,
}

impl<S: ToString> Renderable for OtpEmail<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #172554;" {
                div style="background-color: #1e40af; padding: 30px; border-radius: 10px; box-shadow: 0 4px 6px rgba(0,0,0,0.2);" {
                    h2 style="color: #ffffff; text-align: center; margin-bottom: 20px; font-size: 24px;" {
                        "One-Time Password (OTP)"
                    }
                    p style="color: #ffffff; line-height: 1.6; opacity: 0.9;" {
                        "Dear User,"
                    }
                    p style="color: #ffffff; line-height: 1.6; opacity: 0.9;" {
                        "You have requested access to the JRMSU Tabulation System. Please use the following One-Time Password (OTP) to complete your login:"
                    }
                    div style="text-align: center; margin: 30px 0;" {
                        span style="background-color: #ffffff; color: #1e40af; padding: 10px 20px; border-radius: 5px; font-size: 24px; letter-spacing: 2px; font-weight: bold;" {
                            (self.code.to_string())
                        }
                    }
                    p style="color: #ffffff; line-height: 1.6; opacity: 0.9;" {
                        strong style="color: #ffffff;" { "Important:" }
                        br;
                        "- This OTP is valid for a limited time"
                        br;
                        "- Do not share this code with anyone"
                        br;
                        "- This is an automated message. Please do not reply"
                    }
                    p style="color: #ffffff; font-size: 12px; text-align: center; margin-top: 20px; opacity: 0.7;" {
                        (format!("© {} JRMSU Tabulation System", self.year))
                    }
                }
            }
        })
        .render_to(buffer);
    }
}

/// Renders the OTP email body for the current year.
pub fn render_otp_email(code: &str) -> String {
    OtpEmail {
        code,
        year: Utc::now().year(),
    }
    .render()
    .into_inner()
}
