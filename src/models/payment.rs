/// 真实 MTurk 端点
pub const LIVE_ENDPOINT: &str = "https://mturk-requester.us-east-1.amazonaws.com";
/// 沙盒 MTurk 端点
pub const SANDBOX_ENDPOINT: &str = "https://mturk-requester-sandbox.us-east-1.amazonaws.com";

/// 支付模式
///
/// 决定使用的端点、资格记录文件中的分区以及工人预览链接
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMode {
    /// 真钱（正式环境）
    RealMoney,
    /// 假钱（沙盒环境）
    FakeMoney,
}

impl PaymentMode {
    /// 根据是否支付真钱选择模式
    pub fn from_flag(pay_real_money: bool) -> Self {
        if pay_real_money {
            PaymentMode::RealMoney
        } else {
            PaymentMode::FakeMoney
        }
    }

    /// 资格记录文件中的分区键
    pub fn section_key(self) -> &'static str {
        match self {
            PaymentMode::RealMoney => "RealMoney",
            PaymentMode::FakeMoney => "FakeMoney",
        }
    }

    /// API 端点
    pub fn endpoint(self) -> &'static str {
        match self {
            PaymentMode::RealMoney => LIVE_ENDPOINT,
            PaymentMode::FakeMoney => SANDBOX_ENDPOINT,
        }
    }

    /// 工人可见的预览链接
    pub fn preview_url(self, hit_group_id: &str) -> String {
        let host = match self {
            PaymentMode::RealMoney => "worker.mturk.com",
            PaymentMode::FakeMoney => "workersandbox.mturk.com",
        };
        format!("https://{}/mturk/preview?groupId={}", host, hit_group_id)
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.section_key())
    }
}
