//! Static UI string tables and the language codes that select them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
    Es,
    Ja,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Ar,
        Language::Fr,
        Language::Es,
        Language::Ja,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::Ja => "ja",
        }
    }

    /// Name used when instructing the model which language to answer in.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
            Language::Fr => "French",
            Language::Es => "Spanish",
            Language::Ja => "Japanese",
        }
    }

    /// Label shown in the language switcher.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية",
            Language::Fr => "Français",
            Language::Es => "Español",
            Language::Ja => "日本語",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    pub fn texts(self) -> &'static Translation {
        match self {
            Language::En => &EN,
            Language::Ar => &AR,
            Language::Fr => &FR,
            Language::Es => &ES,
            Language::Ja => &JA,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code `{0}`")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub app_name: &'static str,
    pub tagline: &'static str,
    pub hero_title: &'static str,
    pub hero_highlight: &'static str,
    pub hero_desc: &'static str,
    pub upload_title: &'static str,
    pub upload_desc: &'static str,
    pub privacy: &'static str,
    pub ready: &'static str,
    pub analyze_btn: &'static str,
    pub cancel_btn: &'static str,
    pub analyzing_title: &'static str,
    pub analyzing_desc: &'static str,
    pub failed_title: &'static str,
    pub failed_message: &'static str,
    pub not_an_image: &'static str,
    pub try_again: &'static str,
    pub current_score: &'static str,
    pub potential_score: &'static str,
    pub analyzed: &'static str,
    pub attainable: &'static str,
    pub key_attributes: &'static str,
    pub face_shape: &'static str,
    pub skin_quality: &'static str,
    pub best_feature: &'static str,
    pub aesthetic_analysis: &'static str,
    pub feature_harmony: &'static str,
    pub breakdown: &'static str,
    pub improvements: &'static str,
    pub analyze_another: &'static str,
}

static EN: Translation = Translation {
    app_name: "Aesthetica.ai",
    tagline: "Professional Aesthetic Engine",
    hero_title: "Unlock your",
    hero_highlight: "true potential.",
    hero_desc: "Advanced AI analysis of your facial harmony, skin health, and grooming. Get a realistic score and actionable, dermatologically-backed advice.",
    upload_title: "Upload your photo",
    upload_desc: "Drag & drop or click to select. Ensure good lighting and a clear view of your face.",
    privacy: "Privacy Note: Images are processed in real-time and are not stored on our servers.",
    ready: "Ready for analysis",
    analyze_btn: "Analyze Aesthetics",
    cancel_btn: "Cancel",
    analyzing_title: "Analyzing Geometry",
    analyzing_desc: "Measuring symmetry • Evaluating skin texture • Calculating score",
    failed_title: "Analysis Failed",
    failed_message: "Failed to analyze image. Please ensure the API key is valid and the image is clear.",
    not_an_image: "Please upload an image file",
    try_again: "Try Again",
    current_score: "Current Score",
    potential_score: "Potential",
    analyzed: "Analyzed",
    attainable: "Attainable",
    key_attributes: "Key Attributes",
    face_shape: "Face Shape",
    skin_quality: "Skin Quality",
    best_feature: "Best Feature",
    aesthetic_analysis: "Aesthetic Analysis",
    feature_harmony: "Feature Harmony",
    breakdown: "Detailed Breakdown",
    improvements: "Actionable Improvements",
    analyze_another: "Analyze Another Photo",
};

static AR: Translation = Translation {
    app_name: "أستيتيكا.ai",
    tagline: "محرك جمالي احترافي",
    hero_title: "اكتشف",
    hero_highlight: "إمكانياتك الحقيقية.",
    hero_desc: "تحليل ذكاء اصطناعي متقدم لتناسق الوجه، صحة البشرة، والمظهر العام. احصل على تقييم واقعي ونصائح قابلة للتطبيق.",
    upload_title: "حمل صورتك",
    upload_desc: "اسحب وأفلت أو انقر للاختيار. تأكد من وجود إضاءة جيدة ورؤية واضحة للوجه.",
    privacy: "ملاحظة الخصوصية: تتم معالجة الصور في الوقت الفعلي ولا يتم تخزينها على خوادمنا.",
    ready: "جاهز للتحليل",
    analyze_btn: "تحليل الجماليات",
    cancel_btn: "إلغاء",
    analyzing_title: "جاري تحليل الهندسة",
    analyzing_desc: "قياس التناظر • تقييم ملمس البشرة • حساب النتيجة",
    failed_title: "فشل التحليل",
    failed_message: "تعذر تحليل الصورة. يرجى التأكد من صلاحية مفتاح الواجهة ووضوح الصورة.",
    not_an_image: "يرجى تحميل ملف صورة",
    try_again: "حاول مرة أخرى",
    current_score: "النتيجة الحالية",
    potential_score: "الإمكانية",
    analyzed: "تم التحليل",
    attainable: "يمكن تحقيقه",
    key_attributes: "السمات الرئيسية",
    face_shape: "شكل الوجه",
    skin_quality: "جودة البشرة",
    best_feature: "أفضل ميزة",
    aesthetic_analysis: "التحليل الجمالي",
    feature_harmony: "تناغم الميزات",
    breakdown: "تفصيل دقيق",
    improvements: "تحسينات قابلة للتنفيذ",
    analyze_another: "تحليل صورة أخرى",
};

static FR: Translation = Translation {
    app_name: "Aesthetica.ai",
    tagline: "Moteur Esthétique Professionnel",
    hero_title: "Révélez votre",
    hero_highlight: "vrai potentiel.",
    hero_desc: "Analyse avancée par IA de l'harmonie faciale, de la peau et du style. Obtenez un score réaliste et des conseils dermatologiques concrets.",
    upload_title: "Téléchargez votre photo",
    upload_desc: "Glissez-déposez ou cliquez pour sélectionner. Assurez-vous d'un bon éclairage et d'une vue claire du visage.",
    privacy: "Confidentialité : Les images sont traitées en temps réel et ne sont pas stockées.",
    ready: "Prêt pour l'analyse",
    analyze_btn: "Analyser l'esthétique",
    cancel_btn: "Annuler",
    analyzing_title: "Analyse de la géométrie",
    analyzing_desc: "Mesure de la symétrie • Évaluation de la texture • Calcul du score",
    failed_title: "Échec de l'analyse",
    failed_message: "Impossible d'analyser l'image. Vérifiez que la clé API est valide et que l'image est nette.",
    not_an_image: "Veuillez télécharger un fichier image",
    try_again: "Réessayer",
    current_score: "Score Actuel",
    potential_score: "Potentiel",
    analyzed: "Analysé",
    attainable: "Atteignable",
    key_attributes: "Attributs Clés",
    face_shape: "Forme du visage",
    skin_quality: "Qualité de peau",
    best_feature: "Meilleur atout",
    aesthetic_analysis: "Analyse Esthétique",
    feature_harmony: "Harmonie des traits",
    breakdown: "Détail complet",
    improvements: "Améliorations concrètes",
    analyze_another: "Analyser une autre photo",
};

static ES: Translation = Translation {
    app_name: "Aesthetica.ai",
    tagline: "Motor Estético Profesional",
    hero_title: "Desbloquea tu",
    hero_highlight: "verdadero potencial.",
    hero_desc: "Análisis avanzado de IA sobre armonía facial, salud de la piel y estilo. Obtén una puntuación realista y consejos prácticos.",
    upload_title: "Sube tu foto",
    upload_desc: "Arrastra y suelta o haz clic para seleccionar. Asegura buena iluminación y vista clara.",
    privacy: "Privacidad: Las imágenes se procesan en tiempo real y no se guardan.",
    ready: "Listo para análisis",
    analyze_btn: "Analizar Estética",
    cancel_btn: "Cancelar",
    analyzing_title: "Analizando Geometría",
    analyzing_desc: "Midiendo simetría • Evaluando textura • Calculando puntuación",
    failed_title: "Análisis fallido",
    failed_message: "No se pudo analizar la imagen. Asegúrate de que la clave API sea válida y la imagen sea clara.",
    not_an_image: "Por favor, sube un archivo de imagen",
    try_again: "Intentar de nuevo",
    current_score: "Puntuación Actual",
    potential_score: "Potencial",
    analyzed: "Analizado",
    attainable: "Alcanzable",
    key_attributes: "Atributos Clave",
    face_shape: "Forma facial",
    skin_quality: "Calidad de piel",
    best_feature: "Mejor rasgo",
    aesthetic_analysis: "Análisis Estético",
    feature_harmony: "Armonía de rasgos",
    breakdown: "Desglose detallado",
    improvements: "Mejoras procesables",
    analyze_another: "Analizar otra foto",
};

static JA: Translation = Translation {
    app_name: "Aesthetica.ai",
    tagline: "プロフェッショナル美学エンジン",
    hero_title: "あなたの",
    hero_highlight: "真の可能性を。",
    hero_desc: "顔の調和、肌の健康、身だしなみを高度なAIで分析。現実的なスコアと具体的なアドバイスを提供します。",
    upload_title: "写真をアップロード",
    upload_desc: "ドラッグ＆ドロップまたはクリックして選択。明るい場所で顔がはっきり見えるようにしてください。",
    privacy: "プライバシー：画像はリアルタイムで処理され、保存されることはありません。",
    ready: "分析準備完了",
    analyze_btn: "美学を分析する",
    cancel_btn: "キャンセル",
    analyzing_title: "形状を分析中",
    analyzing_desc: "対称性の測定 • 肌質の評価 • スコア計算中",
    failed_title: "分析に失敗しました",
    failed_message: "画像を分析できませんでした。APIキーが有効で、画像が鮮明であることを確認してください。",
    not_an_image: "画像ファイルをアップロードしてください",
    try_again: "再試行",
    current_score: "現在のスコア",
    potential_score: "ポテンシャル",
    analyzed: "分析済み",
    attainable: "到達可能",
    key_attributes: "主な属性",
    face_shape: "顔の形",
    skin_quality: "肌質",
    best_feature: "最高の特徴",
    aesthetic_analysis: "美的分析",
    feature_harmony: "特徴の調和",
    breakdown: "詳細内訳",
    improvements: "具体的な改善策",
    analyze_another: "別の写真を分析",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
        assert_eq!("JA".parse::<Language>().unwrap(), Language::Ja);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_codes() {
        assert_eq!(serde_json::to_string(&Language::Fr).unwrap(), "\"fr\"");
        let parsed: Language = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(parsed, Language::Es);
    }

    #[test]
    fn only_arabic_is_rtl() {
        let rtl: Vec<_> = Language::ALL.into_iter().filter(|l| l.is_rtl()).collect();
        assert_eq!(rtl, vec![Language::Ar]);
    }

    #[test]
    fn every_table_is_filled() {
        for lang in Language::ALL {
            let value = serde_json::to_value(lang.texts()).unwrap();
            let map = value.as_object().unwrap();
            assert_eq!(map.len(), 30);
            for (key, text) in map {
                assert!(
                    !text.as_str().unwrap().trim().is_empty(),
                    "{lang}: `{key}` is empty"
                );
            }
        }
    }
}
