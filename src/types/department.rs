//! Departments and their production item catalogs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of lab departments.
///
/// Serialized with the same names the spreadsheet and browser backups use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "大阪模型")]
    OsakaModel,
    #[serde(rename = "パターン")]
    Pattern,
    #[serde(rename = "埋没・カット計量")]
    InvestCut,
    #[serde(rename = "完成A")]
    CompleteA,
    #[serde(rename = "完成B")]
    CompleteB,
    #[serde(rename = "完成C")]
    CompleteC,
    #[serde(rename = "CAD/CAM")]
    CadCam,
    #[serde(rename = "デンチャー")]
    Denture,
}

/// A titled group of items within a department's catalog
#[derive(Debug, Clone, Copy)]
pub struct CatalogSection {
    pub title: &'static str,
    pub items: &'static [&'static str],
}

impl Department {
    /// Display order used by every report view
    pub const ALL: [Department; 8] = [
        Department::OsakaModel,
        Department::Pattern,
        Department::InvestCut,
        Department::CompleteA,
        Department::CompleteB,
        Department::CompleteC,
        Department::CadCam,
        Department::Denture,
    ];

    /// Wire/display name (identical in this lab's data)
    pub fn label(&self) -> &'static str {
        match self {
            Self::OsakaModel => "大阪模型",
            Self::Pattern => "パターン",
            Self::InvestCut => "埋没・カット計量",
            Self::CompleteA => "完成A",
            Self::CompleteB => "完成B",
            Self::CompleteC => "完成C",
            Self::CadCam => "CAD/CAM",
            Self::Denture => "デンチャー",
        }
    }

    /// ASCII code accepted on the command line
    pub fn code(&self) -> &'static str {
        match self {
            Self::OsakaModel => "OSAKA_MODEL",
            Self::Pattern => "PATTERN",
            Self::InvestCut => "INVEST_CUT",
            Self::CompleteA => "COMPLETE_A",
            Self::CompleteB => "COMPLETE_B",
            Self::CompleteC => "COMPLETE_C",
            Self::CadCam => "CAD_CAM",
            Self::Denture => "DENTURE",
        }
    }

    /// Resolve a department from its wire name; `None` for anything else
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|d| d.label() == label)
    }

    pub fn sections(&self) -> &'static [CatalogSection] {
        match self {
            Self::OsakaModel => OSAKA_MODEL_SECTIONS,
            Self::Pattern => PATTERN_SECTIONS,
            Self::InvestCut => INVEST_CUT_SECTIONS,
            Self::CompleteA => COMPLETE_A_SECTIONS,
            Self::CompleteB => COMPLETE_B_SECTIONS,
            Self::CompleteC => COMPLETE_C_SECTIONS,
            Self::CadCam => CAD_CAM_SECTIONS,
            Self::Denture => DENTURE_SECTIONS,
        }
    }

    /// All catalog items in display order (sections flattened)
    pub fn catalog(&self) -> impl Iterator<Item = &'static str> {
        self.sections().iter().flat_map(|s| s.items.iter().copied())
    }

    /// Position of `item_name` in the catalog, if present
    pub fn catalog_position(&self, item_name: &str) -> Option<usize> {
        self.catalog().position(|name| name == item_name)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label() == trimmed || d.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown department '{}'", trimmed))
    }
}

const OSAKA_MODEL_SECTIONS: &[CatalogSection] = &[CatalogSection {
    title: "製作品目",
    items: &[
        "ノーマル模型(急ぎ)",
        "ノーマル模型(総製作)",
        "貼り付け模型(急ぎ)",
        "貼り付け模型(総製作)",
        "インレー・コア模型(急ぎ)",
        "インレー・コア模型(総製作)",
        "総数(急ぎ)",
        "総数(総製作)",
    ],
}];

const PATTERN_SECTIONS: &[CatalogSection] = &[CatalogSection {
    title: "製作品目 (本数)",
    items: &[
        "ハイブリッド",
        "HR",
        "FCK",
        "インレー",
        "ラミネート",
        "コア",
        "その他",
    ],
}];

const INVEST_CUT_SECTIONS: &[CatalogSection] = &[CatalogSection {
    title: "工程処理数",
    items: &[
        "スプルー植立",
        "埋没",
        "キャスト",
        "割り出し",
        "カット計量",
        "パターン",
        "その他",
    ],
}];

const COMPLETE_A_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        title: "e.max",
        items: &[
            "マウント(e.max)",
            "トリミング(e.max)",
            "パターン Cr(e.max)",
            "パターン インレー(e.max)",
            "パターン ラミネート(e.max)",
            "植立：埋没・プレス(e.max)",
            "適合・調整(e.max)",
            "ステイン・完成 Cr(e.max)",
            "ステイン・完成 インレー(e.max)",
            "ステイン・完成 ラミネート(e.max)",
        ],
    },
    CatalogSection {
        title: "MB",
        items: &[
            "マウント(MB)",
            "トリミング(MB)",
            "パターン(フルカントゥア)",
            "パターン(キャップ)",
            "植立・埋没・キャスト(MB)",
            "メタル調整(MB)",
            "前ロウ(ヶ所)",
            "築盛(MB)",
            "形態修正・完成(MB)",
        ],
    },
    CatalogSection {
        title: "Zirconia",
        items: &[
            "マウント(Zir)",
            "トリミング(Zir)",
            "設計・送り(Zir)",
            "適合・調整(Zir)",
            "フルジルコニア ステイン・完成(Cr)",
            "フルジルコニア ステイン・完成(インレー)",
            "レイヤリング(築盛)(Zir)",
            "レイヤリング(形成修正・完成)(Zir)",
        ],
    },
    CatalogSection {
        title: "CAD/CAM",
        items: &["CAD/CAM(スキャン)", "CAD/CAM(設計)", "CAD/CAM(完成)"],
    },
];

const COMPLETE_B_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        title: "工程",
        items: &[
            "メタル(適合～オペーク)",
            "築盛(築盛)",
            "形態(コンタクト～形態)",
            "研磨(シリコン～)",
            "ホワイトWAX(築盛～形態)",
            "トリミング(チェック～)",
        ],
    },
    CatalogSection {
        title: "製作品目",
        items: &[
            "トリミング",
            "ハードレジン",
            "HJK",
            "HB(インレー/ジャケット)",
            "HB(金属裏装)",
            "ファイバーコア(自費)",
            "ファイバーコア(保険)",
            "CRインレー",
            "クラウン",
            "インレー",
            "ホワイトWAX",
        ],
    },
    CatalogSection {
        title: "CAD製作品目",
        items: &["CAD/CAM(設計)", "CAD/CAM(完成)"],
    },
];

const COMPLETE_C_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        title: "調整・適合",
        items: &[
            "調整・適合",
            "調整・コンタクト",
            "調整・バイト",
            "ネジ付け・FMC/In",
            "研磨・FMC/In",
            "研磨・ブリッジ",
            "研磨・コア",
            "ネジ外し・FMC/In",
            "レーズ・ブリッジ",
        ],
    },
    CatalogSection {
        title: "品目",
        items: &[
            "クラウン",
            "インレー",
            "コア",
            "自費クラウン",
            "自費インレー",
            "自費コア",
        ],
    },
];

const CAD_CAM_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        title: "工程",
        items: &[
            "CAD/CAM(スキャン)",
            "CAD/CAM(設計)",
            "CAD/CAM(完成)",
            "IOS",
            "AI/Zir",
        ],
    },
    CatalogSection {
        title: "データ送り",
        items: &["3D (データ送り)", "CAD/CAM冠 (データ送り)"],
    },
];

const DENTURE_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        title: "基本",
        items: &[
            "台付(個)",
            "トリミング(個)",
            "バイト(ケース)",
            "マウント(ケース)",
            "印象(個)",
        ],
    },
    CatalogSection {
        title: "3D/CAD",
        items: &[
            "3Dデンチャー 設計(本)",
            "3Dデンチャー 完成(本)",
            "CAD/CAM(設計)",
            "CAD/CAM(完成)",
        ],
    },
    CatalogSection {
        title: "製作",
        items: &[
            "ベース",
            "ロー堤",
            "トレー",
            "クラスプ・バー設計(本)",
            "クラスプ・バー パターン(本)",
            "クラスプ・バー 埋没(本)",
            "クラスプ ワイヤー屈曲(本)",
            "サンドブラスト(本)",
            "クラスプ・バー 研磨(本)",
            "クラスプ適合(本)",
            "ソルダーロー着(ヶ所)",
            "コバルトロー着(ヶ所)",
            "補強床※(枚)",
        ],
    },
    CatalogSection {
        title: "排列",
        items: &[
            "試適排列(1-4歯)(床)",
            "試適排列(5-8歯)(床)",
            "試適排列(9-12歯)(床)",
            "試適排列(13-総義歯)(床)",
            "重合排列-咬合調整(1-4歯)(床)",
            "重合排列-咬合調整(5-8歯)(床)",
            "重合排列-咬合調整(9-12歯)(床)",
            "重合排列-咬合調整(13-総義歯)(床)",
            "組み立て(床)",
            "試適形成(床)",
            "重排形成(床)",
            "補強線屈曲(床)",
            "補強線ロー着(床)",
        ],
    },
    CatalogSection {
        title: "設計",
        items: &["デンチャー設計(ブロックアウト含む)(床)", "副模型製作(個)"],
    },
    CatalogSection {
        title: "維持屈曲",
        items: &[
            "デンチャー埋没(床)",
            "脱漏(自費は１人・保険２人当たりの数)(床)",
            "墳入(リング)",
            "割り出し　前工程(リング)",
            "対合はずし・洗浄(床)",
            "流し込み　前処理(シリコン型取り)(床)",
            "流し込み(人工歯置き換え含む)(ケース)",
        ],
    },
    CatalogSection {
        title: "プレス",
        items: &[
            "カスタムトレー(ホワイトニング用)(床)",
            "ナイトガードソフト(プレス)(床)",
            "咬合調整(ナイトガードソフトラミネート処理・有)(床)",
            "咬合調整(ナイトガードソフトラミネート処理・無)(床)",
            "ナイトガードハード(プレス)(床)",
            "咬合調整(ナイトガードハード)(床)",
            "スポーツマウスピース(ラミネート処理・有)(床)",
            "スポーツマウスピース(ラミネート処理・無)(床)",
        ],
    },
    CatalogSection {
        title: "修理研磨",
        items: &[
            "ソフトリライニング(墳入～仕上まで)(床)",
            "義歯修理(破折・増歯・補強線追加)(床)",
            "適合(床)",
            "床研磨(床)",
        ],
    },
    CatalogSection {
        title: "その他",
        items: &[
            "ネーム入れ(デンチャー・プレス)(床)",
            "メッシュプレート(動揺歯固定)(枚)",
            "バリオ(床)",
            "チェック",
            "矯正",
            "その他",
        ],
    },
];
