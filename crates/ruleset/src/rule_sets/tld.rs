//! Static top-level domain table.
//!
//! Generic TLDs in common use plus every ISO 3166 country-code TLD, in
//! their ASCII (punycode) form. The table is compiled in; there is no
//! registry lookup.

use std::collections::HashSet;
use std::sync::LazyLock;

const GENERIC: &str = "
    com net org edu gov mil int arpa
    aero asia biz cat coop info jobs mobi museum name post pro tel travel xxx
    academy agency app art blog build business cafe cloud club codes company
    consulting design dev digital email engineering events expert finance
    global group guru health host inc institute link live ltd management
    market media network news ninja one online page photography plus press
    run services shop site social software solutions space store studio
    support systems team tech technology today tools top town website wiki
    work works world xyz zone
    xn--p1ai xn--fiqs8s xn--fiqz9s xn--j6w193g xn--3e0b707e xn--90ais
";

const COUNTRY_CODE: &str = "
    ac ad ae af ag ai al am ao aq ar as at au aw ax az
    ba bb bd be bf bg bh bi bj bm bn bo bq br bs bt bw by bz
    ca cc cd cf cg ch ci ck cl cm cn co cr cu cv cw cx cy cz
    de dj dk dm do dz
    ec ee eg er es et eu
    fi fj fk fm fo fr
    ga gb gd ge gf gg gh gi gl gm gn gp gq gr gs gt gu gw gy
    hk hm hn hr ht hu
    id ie il im in io iq ir is it
    je jm jo jp
    ke kg kh ki km kn kp kr kw ky kz
    la lb lc li lk lr ls lt lu lv ly
    ma mc md me mg mh mk ml mm mn mo mp mq mr ms mt mu mv mw mx my mz
    na nc ne nf ng ni nl no np nr nu nz
    om
    pa pe pf pg ph pk pl pm pn pr ps pt pw py
    qa
    re ro rs ru rw
    sa sb sc sd se sg sh si sk sl sm sn so sr ss st su sv sx sy sz
    tc td tf tg th tj tk tl tm tn to tr tt tv tw tz
    ua ug uk us uy uz
    va vc ve vg vi vn vu
    wf ws
    ye yt
    za zm zw
";

static TLDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    GENERIC
        .split_whitespace()
        .chain(COUNTRY_CODE.split_whitespace())
        .collect()
});

/// Returns true if `label` (lowercase ASCII) is a known top-level domain.
pub(crate) fn is_known(label: &str) -> bool {
    TLDS.contains(label)
}
