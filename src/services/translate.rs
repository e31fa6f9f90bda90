// 翻译服务
//
// 静态翻译表在进程启动时构建，此后只读。
// 未命中的语言回退到英语，未命中的键原样返回。

use crate::utils::config::read_global_config;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 占位符，按参数顺序依次替换
const PLACEHOLDER: &str = "{?}";

/// 回退语言
const FALLBACK_LANG: &str = "en";

type TranslationTable = HashMap<&'static str, &'static str>;

/// 全部翻译表，按两位语言代码索引
static TRANSLATIONS: Lazy<HashMap<&'static str, TranslationTable>> = Lazy::new(|| {
    let mut tables = HashMap::new();

    let en: TranslationTable = [
        ("GridActionSpeak", "Speak label"),
        ("GridActionSpeakCustom", "Speak custom text"),
        ("GridActionNavigate", "Navigate to other grid"),
        ("de", "German"),
        ("en", "English"),
        ("es", "Spanish"),
        ("fr", "French"),
        ("hi", "Hindi"),
        ("id", "Indonesian"),
        ("it", "Italian"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("nl", "Dutch"),
        ("pl", "Polish"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
        ("zh", "Chinese"),
    ]
    .into_iter()
    .collect();

    let de: TranslationTable = [
        ("GridActionSpeak", "Label aussprechen"),
        ("GridActionSpeakCustom", "Benutzerdefinierten Text aussprechen"),
        ("GridActionNavigate", "Zu anderem Grid navigieren"),
        ("de", "Deutsch"),
        ("en", "Englisch"),
        ("es", "Spanisch"),
        ("fr", "Französisch"),
        ("hi", "Hindi"),
        ("id", "Indonesisch"),
        ("it", "Italienisch"),
        ("ja", "Japanisch"),
        ("ko", "Koreanisch"),
        ("nl", "Holländisch"),
        ("pl", "Polnisch"),
        ("pt", "Portugiesisch"),
        ("ru", "Russisch"),
        ("zh", "Chinesisch"),
    ]
    .into_iter()
    .collect();

    tables.insert("en", en);
    tables.insert("de", de);
    tables
});

/// 翻译服务
pub struct TranslateService {
    lang: String,
}

impl TranslateService {
    /// 创建翻译服务，语言从配置与环境检测一次
    pub fn new() -> Self {
        Self {
            lang: detect_lang(),
        }
    }

    /// 指定语言创建翻译服务
    pub fn with_lang(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }

    /// 当前两位语言代码
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// 翻译单个键
    pub fn translate(&self, key: &str) -> String {
        self.translate_args(key, &[])
    }

    /// 翻译并依次替换 `{?}` 占位符
    pub fn translate_args(&self, key: &str, args: &[&str]) -> String {
        let lang = if TRANSLATIONS.contains_key(self.lang.as_str()) {
            self.lang.as_str()
        } else {
            FALLBACK_LANG
        };

        let mut translated = TRANSLATIONS
            .get(lang)
            .and_then(|table| table.get(key))
            .map(|text| text.to_string())
            .unwrap_or_else(|| key.to_string());

        for arg in args {
            translated = translated.replacen(PLACEHOLDER, arg, 1);
        }
        translated
    }
}

impl Default for TranslateService {
    fn default() -> Self {
        Self::new()
    }
}

/// 检测界面语言：配置的 locale 优先，其次 LANG 环境变量，最后英语
fn detect_lang() -> String {
    let configured = read_global_config()
        .ok()
        .flatten()
        .and_then(|config| config.locale);
    let env_lang = std::env::var("LANG").ok();
    resolve_lang(configured.as_deref(), env_lang.as_deref())
}

/// 把 locale 字符串（如 "de_DE.UTF-8"）归一化为两位小写语言代码
fn resolve_lang(configured: Option<&str>, env_lang: Option<&str>) -> String {
    let raw = configured.or(env_lang).unwrap_or_default();
    let code: String = raw.chars().take(2).flat_map(char::to_lowercase).collect();
    if code.chars().count() == 2 {
        code
    } else {
        FALLBACK_LANG.to_string()
    }
}
